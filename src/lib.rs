//! Backend for the OnlineFix Steam plugin: fetches a title's fix archive and
//! merges it into the game directory, plus the small stores the UI relies on.

pub mod backend;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use backend::{AppState, PluginBackend};
pub use errors::{BackendError, FixError, Result};
pub use models::{AppId, FixOutcome};
