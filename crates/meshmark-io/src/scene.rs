use anyhow::{Context, Result};
use meshmark_base::{Error, HexColor, MeshId};
use std::path::Path;
use truck_polymesh::PolygonMesh;

use crate::{gltf_loader, obj};

/// A named, triangulated mesh in world coordinates.
#[derive(Clone, Debug)]
pub struct SceneMesh {
    pub id: MeshId,
    pub mesh: PolygonMesh,
    /// Material color used when the session has no assignment for this mesh.
    pub base_color: HexColor,
}

#[derive(Clone, Debug, Default)]
pub struct SceneAsset {
    pub label: String,
    pub meshes: Vec<SceneMesh>,
}

impl SceneAsset {
    /// First mesh with the given name.
    pub fn mesh(&self, id: &MeshId) -> Option<&SceneMesh> {
        self.meshes.iter().find(|mesh| &mesh.id == id)
    }

    pub fn mesh_ids(&self) -> impl Iterator<Item = &MeshId> {
        self.meshes.iter().map(|mesh| &mesh.id)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes
            .iter()
            .map(|mesh| mesh.mesh.positions().len())
            .sum()
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.mesh.faces().len()).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneFormat {
    Gltf,
    Obj,
}

impl SceneFormat {
    pub fn from_path(path: &Path) -> meshmark_base::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "gltf" | "glb" => Ok(Self::Gltf),
            "obj" => Ok(Self::Obj),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneAsset> {
    let path = path.as_ref();
    let format = SceneFormat::from_path(path)?;
    let meshes = match format {
        SceneFormat::Gltf => gltf_loader::load_gltf_meshes(path)
            .with_context(|| format!("load glTF scene {}", path.display()))?,
        SceneFormat::Obj => obj::load_obj_meshes(path)
            .with_context(|| format!("load OBJ scene {}", path.display()))?,
    };
    if meshes.is_empty() {
        return Err(Error::EmptyScene.into());
    }

    let label = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("scene")
        .to_string();
    tracing::info!(
        path = %path.display(),
        meshes = meshes.len(),
        "scene loaded"
    );
    Ok(SceneAsset { label, meshes })
}
