use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "currentModel.gltf";

#[derive(Parser)]
#[command(name = "meshmark-view")]
#[command(about = "Select, color and annotate the meshes of a 3D model")]
pub struct CliArgs {
    /// Scene asset to open (glTF, GLB or OBJ).
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: PathBuf,
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand)]
pub enum Mode {
    Headless {
        #[command(subcommand)]
        command: HeadlessCommand,
    },
}

#[derive(Subcommand)]
pub enum HeadlessCommand {
    /// List the meshes a scene asset contains.
    Meshes(MeshesArgs),
}

#[derive(Args)]
pub struct MeshesArgs {
    #[arg(long = "in")]
    pub input: PathBuf,
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults_to_current_model() {
        let args = CliArgs::parse_from(["meshmark-view"]);
        assert_eq!(args.model, PathBuf::from(DEFAULT_MODEL));
        assert!(args.mode.is_none());
    }

    #[test]
    fn headless_meshes_parses_input_and_json() {
        let args = CliArgs::parse_from(["meshmark-view", "headless", "meshes", "--in", "car.glb", "--json"]);
        match args.mode {
            Some(Mode::Headless {
                command: HeadlessCommand::Meshes(meshes),
            }) => {
                assert_eq!(meshes.input, PathBuf::from("car.glb"));
                assert!(meshes.json);
            }
            None => panic!("expected headless mode"),
        }
    }
}
