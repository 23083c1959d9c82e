use anyhow::Result;
use meshmark_base::{Error, MeshId};
use meshmark_io::{SceneFormat, load_scene};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> Result<PathBuf> {
    let mut path = std::env::temp_dir();
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_nanos(),
        Err(_) => 0,
    };
    path.push(format!("meshmark_{stamp}_{name}"));
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// One triangle (0,0,0) (1,0,0) (0,1,0) followed by u16 indices 0,1,2.
fn triangle_buffer() -> Vec<u8> {
    let mut bytes = Vec::new();
    for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    for index in [0u16, 1, 2] {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    bytes
}

const CAR_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [
    { "name": "Car", "children": [1, 2, 3] },
    { "name": "Wheel_L", "mesh": 0, "translation": [10.0, 0.0, 0.0] },
    { "name": "Wheel_R", "mesh": 0, "translation": [-10.0, 0.0, 0.0] },
    { "mesh": 1 }
  ],
  "meshes": [
    { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] },
    { "name": "Spoiler", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] }
  ],
  "materials": [
    { "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "buffers": [ { "uri": "car.bin", "byteLength": 42 } ]
}"#;

#[test]
fn gltf_meshes_are_named_by_node_and_placed_in_world_space() -> Result<()> {
    let dir = temp_dir("gltf")?;
    fs::write(dir.join("car.bin"), triangle_buffer())?;
    let path = dir.join("car.gltf");
    fs::write(&path, CAR_GLTF)?;

    let scene = load_scene(&path)?;
    let ids: Vec<&str> = scene.mesh_ids().map(MeshId::as_str).collect();
    assert_eq!(ids, ["Wheel_L", "Wheel_R", "Spoiler"]);
    assert_eq!(scene.label, "car.gltf");
    assert_eq!(scene.vertex_count(), 9);
    assert_eq!(scene.face_count(), 3);

    let wheel = scene.mesh(&MeshId::from("Wheel_L")).expect("wheel loaded");
    assert_eq!(wheel.base_color.as_str(), "#ff0000");
    let min_x = wheel
        .mesh
        .positions()
        .iter()
        .map(|p| p.x)
        .fold(f64::INFINITY, f64::min);
    assert!((min_x - 10.0).abs() < 1.0e-9);

    let spoiler = scene.mesh(&MeshId::from("Spoiler")).expect("spoiler loaded");
    assert_eq!(spoiler.base_color.as_str(), "#ffffff");

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}

const TRI_GLB_JSON: &str = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"name":"Tri","mesh":0}],"meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]}],"bufferViews":[{"buffer":0,"byteLength":36}],"buffers":[{"byteLength":36}]}"#;

/// Binary glTF container: 12-byte header, padded JSON chunk, padded BIN chunk.
fn glb_bytes(json: &str, bin: &[u8]) -> Vec<u8> {
    fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8], pad: u8) {
        let padded = data.len().div_ceil(4) * 4;
        out.extend_from_slice(&(padded as u32).to_le_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        out.resize(out.len() + padded - data.len(), pad);
    }

    let mut body = Vec::new();
    chunk(&mut body, b"JSON", json.as_bytes(), b' ');
    chunk(&mut body, b"BIN\0", bin, 0);

    let mut out = Vec::with_capacity(12 + body.len());
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

#[test]
fn glb_with_unindexed_triangle_loads() -> Result<()> {
    let dir = temp_dir("glb")?;
    let path = dir.join("tri.glb");
    // Positions only; the indices appended by `triangle_buffer` are not referenced.
    let positions = &triangle_buffer()[..36];
    fs::write(&path, glb_bytes(TRI_GLB_JSON, positions))?;

    let scene = load_scene(&path)?;
    let ids: Vec<&str> = scene.mesh_ids().map(MeshId::as_str).collect();
    assert_eq!(ids, ["Tri"]);
    assert_eq!(scene.face_count(), 1);
    assert_eq!(scene.vertex_count(), 3);

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn format_detection_ignores_extension_case() -> Result<()> {
    assert_eq!(SceneFormat::from_path(Path::new("car.GLB"))?, SceneFormat::Gltf);
    assert_eq!(SceneFormat::from_path(Path::new("car.Gltf"))?, SceneFormat::Gltf);
    assert_eq!(SceneFormat::from_path(Path::new("panel.OBJ"))?, SceneFormat::Obj);
    assert!(SceneFormat::from_path(Path::new("car")).is_err());
    Ok(())
}

#[test]
fn obj_loads_as_single_mesh_named_by_file() -> Result<()> {
    let dir = temp_dir("obj")?;
    let path = dir.join("panel.obj");
    fs::write(&path, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n")?;

    let scene = load_scene(&path)?;
    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].id, MeshId::from("panel"));
    assert_eq!(scene.vertex_count(), 4);

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() {
    let err = load_scene("model.fbx").expect_err("fbx is not supported");
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = load_scene("does/not/exist.gltf").expect_err("file is missing");
    assert!(format!("{err:#}").contains("exist.gltf"));
}
