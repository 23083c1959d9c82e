mod app;
mod model;
mod painter;
mod panel;

pub use app::run_gui;
