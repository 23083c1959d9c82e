use meshmark_io::SceneAsset;
use truck_base::cgmath64::Point3;

use crate::viewer::{Aabb, ViewerMesh};

pub struct ModelInfo {
    pub label: String,
    pub meshes: usize,
    pub vertices: usize,
    pub faces: usize,
    pub bounds: Option<Aabb>,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            label: "None".to_string(),
            meshes: 0,
            vertices: 0,
            faces: 0,
            bounds: None,
        }
    }
}

impl ModelInfo {
    pub fn from_scene(scene: &SceneAsset, meshes: &[ViewerMesh]) -> Self {
        Self {
            label: scene.label.clone(),
            meshes: scene.meshes.len(),
            vertices: scene.vertex_count(),
            faces: scene.face_count(),
            bounds: meshes.iter().filter_map(|mesh| mesh.bounds).reduce(Aabb::union),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} | meshes: {} | vertices: {} | faces: {}",
            self.label, self.meshes, self.vertices, self.faces
        )
    }
}

pub fn format_point(point: &Point3) -> String {
    format!("{:.3}, {:.3}, {:.3}", point.x, point.y, point.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_summary_names_no_file() {
        let info = ModelInfo::default();
        assert_eq!(info.summary(), "None | meshes: 0 | vertices: 0 | faces: 0");
        assert!(info.bounds.is_none());
    }

    #[test]
    fn points_print_with_three_decimals() {
        assert_eq!(format_point(&Point3::new(-2.0, 0.5, 1.0 / 3.0)), "-2.000, 0.500, 0.333");
    }
}
