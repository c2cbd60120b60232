//! File logging for the backend. The host owns stdout for the bridge, so
//! nothing is ever written to the console.

use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::errors::{BackendError, Result};

pub const LOG_FILE_PREFIX: &str = "onlinefix.log";
/// Overrides the filter for this backend only; `RUST_LOG` is consulted after it.
pub const LOG_FILTER_ENV: &str = "ONLINEFIX_LOG";
// reqwest and hyper are chatty at info while downloading archives.
const DEFAULT_FILTER: &str = "warn,onlinefix_backend=info";

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

pub fn init(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    if LOG_GUARD.set(guard).is_err() {
        return Err(BackendError::Config("logging already initialised".to_string()));
    }

    let subscriber = Subscriber::builder()
        .with_env_filter(filter())
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| BackendError::Config(err.to_string()))?;

    tracing::info!(
        "onlinefix-backend {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
