use meshmark_base::MeshId;
use truck_base::cgmath64::{InnerSpace, Matrix3, Point3, Rad, Vector3};

use super::bounds::Aabb;
use super::input::ViewerInput;
use super::mesh::ViewerMesh;
use super::overlay::OverlayPainter;
use super::pick::Ray;
use super::ui::{Align2, Color32, Point2, Rect, Stroke, Vec2, pos2};

const ORBIT_SPEED: f64 = 0.01;
const PAN_SPEED: f64 = 0.002;
const ZOOM_SPEED: f64 = 0.01;
const NEAR_CLIP: f64 = 1.0e-4;
const MIN_DISTANCE: f64 = 1.0e-3;
const MAX_DISTANCE: f64 = 1.0e7;
/// Pitch stays short of the poles so the view never rolls over.
const MAX_PITCH: f64 = 1.55;

pub const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 210, 90);
pub const HOVER_COLOR: Color32 = Color32::from_rgba_unmultiplied(230, 235, 245, 150);

/// Camera frame: eye position plus right/up/forward unit axes.
#[derive(Clone, Copy, Debug)]
struct Frame {
    eye: Point3,
    right: Vector3,
    up: Vector3,
    forward: Vector3,
}

/// Orthographic world-to-viewport mapping for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    frame: Frame,
    center: Point2,
    scale: f64,
}

impl Projector {
    /// Viewport position and view depth, or `None` behind the camera.
    pub fn project(&self, point: Point3) -> Option<(Point2, f64)> {
        let rel = point - self.frame.eye;
        let depth = rel.dot(self.frame.forward);
        if depth <= NEAR_CLIP {
            return None;
        }
        let x = self.center.x + (rel.dot(self.frame.right) * self.scale) as f32;
        let y = self.center.y - (rel.dot(self.frame.up) * self.scale) as f32;
        Some((pos2(x, y), depth))
    }

    pub fn forward(&self) -> Vector3 {
        self.frame.forward
    }

    /// World offset, on the view plane, of a viewport position from the center.
    fn unproject_offset(&self, pos: Point2) -> Vector3 {
        let dx = (pos.x - self.center.x) as f64 / self.scale;
        let dy = (self.center.y - pos.y) as f64 / self.scale;
        self.frame.right * dx + self.frame.up * dy
    }
}

/// Nearest mesh under the pointer.
#[derive(Clone, Copy, Debug)]
pub struct PickHit {
    pub index: usize,
    pub point: Point3,
}

/// Turntable camera orbiting `target` around the world Y axis.
#[derive(Clone, Debug)]
pub struct ViewerState {
    target: Point3,
    yaw: f64,
    pitch: f64,
    distance: f64,
    fov_deg: f64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            yaw: 0.6,
            pitch: 0.35,
            distance: 10.0,
            fov_deg: 60.0,
        }
    }
}

impl ViewerState {
    pub fn reset_view(&mut self) {
        *self = Self::default();
    }

    /// Centers the box and backs off far enough to see all of it.
    pub fn fit_bounds(&mut self, bounds: Aabb) {
        self.target = bounds.center();
        let radius = bounds.longest_side().max(1.0e-3) * 0.5;
        self.distance = (radius * 3.0).clamp(1.0, MAX_DISTANCE);
    }

    /// Orbit, pan and zoom. Returns true when the camera moved.
    pub fn handle_input(&mut self, input: &ViewerInput) -> bool {
        let delta = input.pointer_delta;
        let dragging = delta.x != 0.0 || delta.y != 0.0;
        let mut moved = false;

        if input.primary_down && dragging {
            self.yaw -= delta.x as f64 * ORBIT_SPEED;
            self.pitch = (self.pitch + delta.y as f64 * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
            moved = true;
        } else if (input.secondary_down || input.middle_down) && dragging {
            let frame = self.frame();
            let step = self.distance * PAN_SPEED;
            self.target = self.target + (frame.up * delta.y as f64 - frame.right * delta.x as f64) * step;
            moved = true;
        }

        if input.hovered && input.scroll_delta != 0.0 {
            self.zoom(input.scroll_delta, input.pointer_pos, input.rect);
            moved = true;
        }
        moved
    }

    pub fn projector(&self, rect: Rect) -> Projector {
        let view_size = rect.width().min(rect.height()) as f64;
        let half_fov = (self.fov_deg.to_radians() * 0.5).tan();
        Projector {
            frame: self.frame(),
            center: rect.center(),
            scale: (view_size / (2.0 * half_fov * self.distance)).max(1.0e-6),
        }
    }

    /// Ray through a viewport position, parallel to the view direction.
    pub fn screen_ray(&self, pos: Point2, rect: Rect) -> Option<Ray> {
        if !rect.contains(pos) {
            return None;
        }
        let projector = self.projector(rect);
        let origin = projector.frame.eye + projector.unproject_offset(pos);
        Some(Ray::new(origin, projector.frame.forward))
    }

    pub fn pick_mesh(&self, pos: Point2, rect: Rect, meshes: &[ViewerMesh]) -> Option<PickHit> {
        let ray = self.screen_ray(pos, rect)?;
        meshes
            .iter()
            .enumerate()
            .filter_map(|(index, mesh)| mesh.ray_pick(&ray).map(|t| (index, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, t)| PickHit {
                index,
                point: ray.at(t),
            })
    }

    pub fn paint_overlay<P: OverlayPainter>(
        &self,
        painter: &mut P,
        rect: Rect,
        meshes: &[ViewerMesh],
        selected: Option<&MeshId>,
        hovered: Option<usize>,
    ) {
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(60)));
        let projector = self.projector(rect);

        if let Some(mesh) = hovered.and_then(|idx| meshes.get(idx)) {
            if Some(&mesh.id) != selected {
                draw_outline(painter, &projector, mesh, Stroke::new(1.0, HOVER_COLOR));
            }
        }

        if let Some(selected) = selected {
            for mesh in meshes.iter().filter(|mesh| &mesh.id == selected) {
                draw_outline(painter, &projector, mesh, Stroke::new(1.6, SELECTED_COLOR));
                if let Some((pos, _)) = mesh.center().and_then(|center| projector.project(center)) {
                    painter.text(pos, Align2::CenterCenter, mesh.id.to_string(), 13.0, SELECTED_COLOR);
                }
            }
        }

        painter.text(
            rect.left_top() + Vec2::new(8.0, 8.0),
            Align2::LeftTop,
            "Click: select mesh | Left-drag: orbit | Right/Middle-drag: pan | Wheel: zoom".to_string(),
            12.0,
            Color32::from_gray(120),
        );
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn target(&self) -> Point3 {
        self.target
    }

    fn frame(&self) -> Frame {
        let turn = Matrix3::from_axis_angle(Vector3::unit_y(), Rad(self.yaw))
            * Matrix3::from_axis_angle(Vector3::unit_x(), Rad(-self.pitch));
        let back = turn * Vector3::unit_z();
        let forward = -back;
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        Frame {
            eye: self.target + back * self.distance,
            right,
            up,
            forward,
        }
    }

    /// Scales the distance and shifts the target so the point under the
    /// cursor stays put.
    fn zoom(&mut self, scroll: f32, cursor: Option<Point2>, rect: Rect) {
        let cursor = cursor.filter(|pos| rect.contains(*pos));
        let before = cursor.map(|pos| self.projector(rect).unproject_offset(pos));
        self.distance = (self.distance * (-scroll as f64 * ZOOM_SPEED).exp())
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
        if let (Some(pos), Some(before)) = (cursor, before) {
            let after = self.projector(rect).unproject_offset(pos);
            self.target = self.target + (before - after);
        }
    }
}

fn draw_outline(
    painter: &mut impl OverlayPainter,
    projector: &Projector,
    mesh: &ViewerMesh,
    stroke: Stroke,
) {
    for &[a, b] in &mesh.edges {
        let project = |idx: usize| mesh.positions.get(idx).and_then(|p| projector.project(*p));
        if let (Some((a, _)), Some((b, _))) = (project(a), project(b)) {
            painter.line_segment(a, b, stroke);
        }
    }
}
