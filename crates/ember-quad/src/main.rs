use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ember_engine::logging::{LoggingConfig, init_logging};
use ember_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

mod app;
mod geometry;

use app::QuadApp;

/// Bundle loaded when no path is given on the command line.
const DEFAULT_BUNDLE: &str = "res/shaders/basic.shader";

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let bundle_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_bundle_path);

    log::info!("ember quad demo, bundle {}", bundle_path.display());

    let config = RuntimeConfig {
        title: "ember quad".to_string(),
        initial_size: LogicalSize::new(640.0, 480.0),
    };

    match Runtime::run(config, QuadApp::new(bundle_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the default bundle against the working directory first, then
/// against the crate directory so `cargo run` works from the workspace root.
fn default_bundle_path() -> PathBuf {
    let local = PathBuf::from(DEFAULT_BUNDLE);
    if local.exists() {
        local
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_BUNDLE)
    }
}
