use std::io;

use onlinefix_backend::backend::AppState;
use onlinefix_backend::utils::paths::{resolve_base_dir, resolve_log_dir};
use onlinefix_backend::{bridge, logging};

fn main() {
    let base_dir = resolve_base_dir();
    let log_dir = resolve_log_dir(&base_dir);
    if let Err(err) = logging::init(&log_dir) {
        eprintln!("failed to initialise logging in {}: {}", log_dir.display(), err);
    }

    let state = match AppState::load(&base_dir) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Backend failed to load: {}", err);
            eprintln!("onlinefix-backend: {}", err);
            std::process::exit(1);
        }
    };
    tracing::info!("Backend loaded");

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = bridge::serve(&state, stdin.lock(), stdout.lock()) {
        tracing::error!("Host bridge stopped: {}", err);
    }

    match state.unload() {
        Ok(()) => tracing::info!("Unloading"),
        Err(err) => tracing::error!("Failed to save position database: {}", err),
    }
}
