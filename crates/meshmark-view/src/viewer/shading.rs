use truck_base::cgmath64::{InnerSpace, Vector3};

use super::mesh::ViewerMesh;
use super::state::Projector;
use super::ui::{Color32, Point2};

/// One screen-space triangle ready to paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedTriangle {
    pub points: [Point2; 3],
    pub color: Color32,
    pub depth: f64,
    /// Index into the mesh slice the triangle came from.
    pub mesh: usize,
}

/// Ambient term plus one directional light.
#[derive(Clone, Copy, Debug)]
pub struct Lighting {
    pub ambient: f64,
    pub directional: f64,
    /// Unit vector pointing from the scene toward the light.
    pub direction: Vector3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.5,
            directional: 1.0,
            direction: Vector3::new(10.0, 10.0, 5.0).normalize(),
        }
    }
}

impl Lighting {
    /// Brightness of a face with the given normal seen along `view_forward`.
    /// Faces are lit on whichever side points at the camera; degenerate
    /// faces (no normal) get ambient light only.
    pub fn intensity(&self, normal: Option<Vector3>, view_forward: Vector3) -> f64 {
        let Some(normal) = normal else {
            return self.ambient.min(1.0);
        };
        let toward_camera = if normal.dot(view_forward) > 0.0 {
            -normal
        } else {
            normal
        };
        let diffuse = toward_camera.dot(self.direction).max(0.0);
        (self.ambient + self.directional * diffuse).clamp(0.0, 1.0)
    }
}

/// Projects and shades every triangle, sorted back to front.
///
/// `color_of` is asked once per mesh on every call, so the painted color
/// always reflects the current color assignments.
pub fn shade_meshes<F>(
    projector: &Projector,
    meshes: &[ViewerMesh],
    lighting: &Lighting,
    mut color_of: F,
) -> Vec<ShadedTriangle>
where
    F: FnMut(&ViewerMesh) -> Color32,
{
    let forward = projector.forward();
    let mut triangles = Vec::new();

    for (mesh_idx, mesh) in meshes.iter().enumerate() {
        if mesh.is_empty() {
            continue;
        }
        let color = color_of(mesh);
        let projected: Vec<Option<(Point2, f64)>> = mesh
            .positions
            .iter()
            .map(|point| projector.project(*point))
            .collect();

        for (tri, normal) in mesh.tri_faces.iter().zip(&mesh.tri_normals) {
            let (Some(a), Some(b), Some(c)) = (projected[tri[0]], projected[tri[1]], projected[tri[2]])
            else {
                continue;
            };
            let shade = lighting.intensity(*normal, forward);
            triangles.push(ShadedTriangle {
                points: [a.0, b.0, c.0],
                color: color.shaded(shade),
                depth: (a.1 + b.1 + c.1) / 3.0,
                mesh: mesh_idx,
            });
        }
    }

    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    triangles
}
