//! glTF 2.0 (`.gltf` / `.glb`) scene loading.
//!
//! Every scene node that carries a mesh becomes one [`SceneMesh`] named after
//! the node. Node transforms are baked into world-space positions, all
//! triangle primitives of a mesh are merged, and the first primitive's
//! base color factor becomes the mesh's display color.

use anyhow::{Context, Result, bail};
use cgmath::{Matrix4, SquareMatrix, Transform};
use gltf::Gltf;
use gltf::buffer::Data as BufferData;
use gltf::mesh::Mode;
use meshmark_base::{HexColor, MeshId};
use std::path::Path;
use tracing::debug;
use truck_base::cgmath64::Point3;
use truck_polymesh::{Faces, PolygonMesh, StandardAttributes, StandardVertex};

use crate::scene::SceneMesh;

pub fn load_gltf_meshes(path: &Path) -> Result<Vec<SceneMesh>> {
    let Gltf { document, blob } =
        Gltf::open(path).with_context(|| format!("open glTF file {}", path.display()))?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)
        .context("read glTF buffers")?;

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Ok(Vec::new());
    };

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Matrix4::identity(), &buffers, &mut meshes)?;
    }
    Ok(meshes)
}

fn visit_node(
    node: &gltf::Node,
    parent: Matrix4<f64>,
    buffers: &[BufferData],
    out: &mut Vec<SceneMesh>,
) -> Result<()> {
    let world = parent * node_matrix(node);

    if let Some(mesh) = node.mesh() {
        let id = mesh_id(node, &mesh);
        match convert_mesh(&mesh, world, buffers)? {
            Some((polygon, base_color)) => out.push(SceneMesh {
                id,
                mesh: polygon,
                base_color,
            }),
            None => debug!(mesh = %id, "node mesh has no triangles, skipped"),
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn node_matrix(node: &gltf::Node) -> Matrix4<f64> {
    let columns = node.transform().matrix().map(|col| col.map(f64::from));
    Matrix4::from(columns)
}

fn mesh_id(node: &gltf::Node, mesh: &gltf::Mesh) -> MeshId {
    node.name()
        .or_else(|| mesh.name())
        .map(MeshId::new)
        .unwrap_or_else(|| MeshId::new(format!("mesh_{}", mesh.index())))
}

fn convert_mesh(
    mesh: &gltf::Mesh,
    world: Matrix4<f64>,
    buffers: &[BufferData],
) -> Result<Option<(PolygonMesh, HexColor)>> {
    let mut positions: Vec<Point3> = Vec::new();
    let mut tri_faces: Vec<[StandardVertex; 3]> = Vec::new();
    let mut base_color = None;

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            debug!(mode = ?primitive.mode(), "non-triangle primitive skipped");
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(points) = reader.read_positions() else {
            continue;
        };

        let offset = positions.len();
        positions.extend(points.map(|[x, y, z]| {
            world.transform_point(Point3::new(f64::from(x), f64::from(y), f64::from(z)))
        }));
        let count = positions.len() - offset;

        let indices: Vec<usize> = match reader.read_indices() {
            Some(indices) => indices.into_u32().map(|idx| idx as usize).collect(),
            None => (0..count).collect(),
        };
        if let Some(bad) = indices.iter().find(|idx| **idx >= count) {
            bail!("primitive index {bad} out of range for {count} vertices");
        }
        tri_faces.extend(indices.chunks_exact(3).map(|tri| {
            [
                vertex(offset + tri[0]),
                vertex(offset + tri[1]),
                vertex(offset + tri[2]),
            ]
        }));

        if base_color.is_none() {
            let factor = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            base_color = Some(linear_to_hex(factor));
        }
    }

    if tri_faces.is_empty() {
        return Ok(None);
    }

    let attributes = StandardAttributes {
        positions,
        uv_coords: Vec::new(),
        normals: Vec::new(),
    };
    let faces = Faces::from_tri_and_quad_faces(tri_faces, Vec::new());
    Ok(Some((
        PolygonMesh::new(attributes, faces),
        base_color.unwrap_or_default(),
    )))
}

fn vertex(pos: usize) -> StandardVertex {
    StandardVertex {
        pos,
        uv: None,
        nor: None,
    }
}

/// glTF color factors are linear; the color picker works in sRGB.
fn linear_to_hex(factor: [f32; 4]) -> HexColor {
    let channel = |value: f32| {
        let value = value.clamp(0.0, 1.0);
        let srgb = if value <= 0.003_130_8 {
            value * 12.92
        } else {
            1.055 * value.powf(1.0 / 2.4) - 0.055
        };
        (srgb * 255.0).round() as u8
    };
    HexColor::from_rgb(channel(factor[0]), channel(factor[1]), channel(factor[2]))
}

#[cfg(test)]
mod tests {
    use super::linear_to_hex;

    #[test]
    fn linear_factors_map_to_srgb_hex() {
        assert_eq!(linear_to_hex([1.0, 0.0, 0.0, 1.0]).as_str(), "#ff0000");
        assert_eq!(linear_to_hex([1.0, 1.0, 1.0, 1.0]).as_str(), "#ffffff");
        assert_eq!(linear_to_hex([0.215_86, 0.215_86, 0.215_86, 1.0]).as_str(), "#808080");
    }
}
