use super::shading::ShadedTriangle;
use super::ui::{Align2, Color32, Point2, Rect, Stroke};

pub trait OverlayPainter {
    fn rect_stroke(&mut self, rect: Rect, radius: f32, stroke: Stroke);
    fn line_segment(&mut self, start: Point2, end: Point2, stroke: Stroke);
    fn text(&mut self, pos: Point2, align: Align2, text: String, size: f32, color: Color32);
    /// Filled triangles, painted in slice order.
    fn triangles(&mut self, triangles: &[ShadedTriangle]);
}

/// Recorded draw call, used to inspect overlays without a GPU.
#[cfg(test)]
#[derive(Clone, Debug)]
pub enum OverlayShape {
    Frame,
    Line(Stroke),
    Text(String),
    Triangles,
}

#[cfg(test)]
#[derive(Default)]
pub struct OverlayCollector {
    pub shapes: Vec<OverlayShape>,
}

#[cfg(test)]
impl OverlayCollector {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            OverlayShape::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn lines_with_color(&self, color: Color32) -> usize {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape, OverlayShape::Line(stroke) if stroke.color == color))
            .count()
    }
}

#[cfg(test)]
impl OverlayPainter for OverlayCollector {
    fn rect_stroke(&mut self, _rect: Rect, _radius: f32, _stroke: Stroke) {
        self.shapes.push(OverlayShape::Frame);
    }

    fn line_segment(&mut self, _start: Point2, _end: Point2, stroke: Stroke) {
        self.shapes.push(OverlayShape::Line(stroke));
    }

    fn text(&mut self, _pos: Point2, _align: Align2, text: String, _size: f32, _color: Color32) {
        self.shapes.push(OverlayShape::Text(text));
    }

    fn triangles(&mut self, _triangles: &[ShadedTriangle]) {
        self.shapes.push(OverlayShape::Triangles);
    }
}
