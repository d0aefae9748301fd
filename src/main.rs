mod app;
mod color;
mod data;
mod error;
mod inference;
mod rng;
mod state;
mod ui;

use std::path::PathBuf;

use app::SliceScopeApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Bundle directory: first CLI argument, or ./artifacts by convention.
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    // Startup load is fail-fast: nothing can be served without a valid
    // bundle, so abort and let the operator fix the artifact files.
    let bundle = match data::loader::load_bundle(&dir) {
        Ok(bundle) => bundle,
        Err(e) => {
            log::error!("cannot start: {e}");
            eprintln!("slice-scope: {e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Slice Scope – CT Axial Position Inspector",
        options,
        Box::new(move |_cc| Ok(Box::new(SliceScopeApp::new(AppState::new(bundle))))),
    )
}
