pub mod gltf_loader;
pub mod obj;
pub mod scene;

pub use scene::{SceneAsset, SceneFormat, SceneMesh, load_scene};
