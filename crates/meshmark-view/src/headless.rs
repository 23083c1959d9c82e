use anyhow::{Context, Result};
use meshmark_io::{SceneAsset, load_scene};
use serde::Serialize;

use crate::cli::{HeadlessCommand, MeshesArgs};

pub fn run_headless(command: HeadlessCommand) -> Result<()> {
    match command {
        HeadlessCommand::Meshes(args) => list_meshes(&args),
    }
}

fn list_meshes(args: &MeshesArgs) -> Result<()> {
    let scene = load_scene(&args.input)?;
    let rows = mesh_rows(&scene);
    if args.json {
        let text = serde_json::to_string_pretty(&rows).context("failed to encode mesh list")?;
        println!("{text}");
    } else {
        print!("{}", render_table(&rows));
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
struct MeshRow {
    id: String,
    vertices: usize,
    faces: usize,
    base_color: String,
}

fn mesh_rows(scene: &SceneAsset) -> Vec<MeshRow> {
    scene
        .meshes
        .iter()
        .map(|mesh| MeshRow {
            id: mesh.id.to_string(),
            vertices: mesh.mesh.positions().len(),
            faces: mesh.mesh.faces().len(),
            base_color: mesh.base_color.to_string(),
        })
        .collect()
}

fn render_table(rows: &[MeshRow]) -> String {
    let width = rows
        .iter()
        .map(|row| row.id.len())
        .max()
        .unwrap_or(0)
        .max("MESH".len());
    let mut out = format!("{:<width$}  {:>8}  {:>8}  COLOR\n", "MESH", "VERTICES", "FACES");
    for row in rows {
        out.push_str(&format!(
            "{:<width$}  {:>8}  {:>8}  {}\n",
            row.id, row.vertices, row.faces, row.base_color
        ));
    }
    out
}
