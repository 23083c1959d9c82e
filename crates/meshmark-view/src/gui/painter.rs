use egui::FontId;

use crate::viewer::{Align2, Color32, OverlayPainter, Point2, Rect, ShadedTriangle, Stroke};

/// Forwards viewer drawing to an egui painter, offset to the viewport origin.
pub struct EguiOverlayPainter<'a> {
    painter: &'a egui::Painter,
    offset: egui::Vec2,
}

impl<'a> EguiOverlayPainter<'a> {
    pub fn new(painter: &'a egui::Painter, offset: egui::Vec2) -> Self {
        Self { painter, offset }
    }
}

impl OverlayPainter for EguiOverlayPainter<'_> {
    fn rect_stroke(&mut self, rect: Rect, radius: f32, stroke: Stroke) {
        let egui_rect = to_egui_rect(rect, self.offset);
        let stroke = egui::Stroke::new(stroke.width, to_egui_color(stroke.color));
        self.painter
            .rect_stroke(egui_rect, radius, stroke, egui::StrokeKind::Inside);
    }

    fn line_segment(&mut self, start: Point2, end: Point2, stroke: Stroke) {
        let points = [
            to_egui_pos(start, self.offset),
            to_egui_pos(end, self.offset),
        ];
        let stroke = egui::Stroke::new(stroke.width, to_egui_color(stroke.color));
        self.painter.line_segment(points, stroke);
    }

    fn text(&mut self, pos: Point2, align: Align2, text: String, size: f32, color: Color32) {
        let pos = to_egui_pos(pos, self.offset);
        let align = match align {
            Align2::LeftTop => egui::Align2::LEFT_TOP,
            Align2::CenterCenter => egui::Align2::CENTER_CENTER,
        };
        self.painter.text(
            pos,
            align,
            text,
            FontId::proportional(size),
            to_egui_color(color),
        );
    }

    fn triangles(&mut self, triangles: &[ShadedTriangle]) {
        if triangles.is_empty() {
            return;
        }
        let mut mesh = egui::Mesh::default();
        for tri in triangles {
            let base = mesh.vertices.len() as u32;
            let color = to_egui_color(tri.color);
            for point in tri.points {
                mesh.colored_vertex(to_egui_pos(point, self.offset), color);
            }
            mesh.add_triangle(base, base + 1, base + 2);
        }
        self.painter.add(egui::Shape::mesh(mesh));
    }
}

fn to_egui_pos(pos: Point2, offset: egui::Vec2) -> egui::Pos2 {
    egui::pos2(pos.x + offset.x, pos.y + offset.y)
}

fn to_egui_rect(rect: Rect, offset: egui::Vec2) -> egui::Rect {
    let min = to_egui_pos(rect.min, offset);
    let max = to_egui_pos(rect.max, offset);
    egui::Rect::from_min_max(min, max)
}

fn to_egui_color(color: Color32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}
