use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::AppId;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Failure exits of the fix pipeline.
///
/// Every variant ends up as `FixOutcome { success: false, error }`; the kind
/// only changes the message text and lets callers branch if they need to.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("Fix not found for AppID {0}")]
    NotFound(AppId),
    #[error("Download failed: {0}")]
    Transport(String),
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not create temporary workspace: {0}")]
    Workspace(#[source] io::Error),
}

impl FixError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> FixErrorKind {
        match self {
            Self::NotFound(_) => FixErrorKind::NotFound,
            Self::Transport(_) => FixErrorKind::Transport,
            Self::CorruptArchive(_) => FixErrorKind::CorruptArchive,
            Self::Filesystem { .. } | Self::Workspace(_) => FixErrorKind::Filesystem,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixErrorKind {
    NotFound,
    Transport,
    CorruptArchive,
    Filesystem,
}
