use std::process::ExitCode;

use arcade_engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, app.scene, app.pump) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }
    info!("shutdown_complete");
    ExitCode::SUCCESS
}
