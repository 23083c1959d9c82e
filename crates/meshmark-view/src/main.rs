use anyhow::Result;
use clap::Parser;
use std::path::Path;

mod cli;
mod headless;
#[cfg(feature = "gui")]
mod gui;
#[cfg(feature = "gui")]
mod viewer;

fn main() -> Result<()> {
    init_tracing();
    let args = cli::CliArgs::parse();
    match args.mode {
        Some(cli::Mode::Headless { command }) => headless::run_headless(command),
        None => run_gui(&args.model),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "gui")]
fn run_gui(model: &Path) -> Result<()> {
    gui::run_gui(model)
}

#[cfg(not(feature = "gui"))]
fn run_gui(model: &Path) -> Result<()> {
    anyhow::bail!(
        "GUI support disabled, cannot open {}. Rebuild with --features gui.",
        model.display()
    );
}
