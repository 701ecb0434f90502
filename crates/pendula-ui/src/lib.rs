//! egui front end: a thin adapter from widgets to `ControlInput`s plus a
//! painter for the chain stage.

mod app;
mod canvas;
mod fractal_panel;

use pendula_core::ClientConfig;
use pendula_platform::Transport;
use tracing::info;

pub use app::PendulaApp;

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("eframe failed: {0}")]
    Eframe(String),
}

/// Run the window on the calling thread until it is closed.
pub fn run_ui(config: ClientConfig, transport: Box<dyn Transport>) -> Result<(), UiError> {
    let viewport = config.viewport;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Pendula")
            .with_inner_size([viewport.width as f32 + 280.0, viewport.height as f32 + 60.0]),
        ..Default::default()
    };

    info!("UI: opening window");
    eframe::run_native(
        "Pendula",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(PendulaApp::new(&config, transport)))),
    )
    .map_err(|e| UiError::Eframe(e.to_string()))
}
