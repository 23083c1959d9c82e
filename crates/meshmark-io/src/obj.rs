use anyhow::{Context, Result, bail};
use meshmark_base::{HexColor, MeshId};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use truck_polymesh::obj;

use crate::scene::SceneMesh;

/// OBJ files load as a single mesh named after the file stem.
pub fn load_obj_meshes(path: &Path) -> Result<Vec<SceneMesh>> {
    let file = File::open(path).with_context(|| format!("open OBJ file {}", path.display()))?;
    let mesh = obj::read(BufReader::new(file))
        .with_context(|| format!("read OBJ file {}", path.display()))?;
    if mesh.positions().is_empty() {
        bail!("OBJ file has no vertices");
    }

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("mesh_0");
    Ok(vec![SceneMesh {
        id: MeshId::new(name),
        mesh,
        base_color: HexColor::white(),
    }])
}
