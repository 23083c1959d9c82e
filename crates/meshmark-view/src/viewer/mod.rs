mod bounds;
mod input;
mod mesh;
mod overlay;
mod pick;
mod shading;
mod state;
mod ui;

pub use bounds::Aabb;
pub use input::{ViewerInput, is_click};
pub use mesh::ViewerMesh;
pub use overlay::OverlayPainter;
pub use shading::{Lighting, ShadedTriangle, shade_meshes};
pub use state::{PickHit, ViewerState};
pub use ui::{Align2, Color32, Point2, Rect, Stroke, Vec2};
