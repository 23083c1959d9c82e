use super::ui::{Point2, Rect, Vec2};

/// Pointer travel, in points, at which a primary press and release stops
/// counting as a click.
pub const CLICK_DRAG_THRESHOLD: f32 = 4.0;

/// Pointer state for one frame, in viewport-local coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewerInput {
    pub rect: Rect,
    pub pointer_pos: Option<Point2>,
    pub pointer_delta: Vec2,
    pub primary_down: bool,
    pub secondary_down: bool,
    pub middle_down: bool,
    pub primary_clicked: bool,
    pub scroll_delta: f32,
    pub hovered: bool,
}

/// True when a press at `press` released at `release` is a click rather
/// than the end of an orbit drag.
pub fn is_click(press: Point2, release: Point2) -> bool {
    press.distance(release) < CLICK_DRAG_THRESHOLD
}
