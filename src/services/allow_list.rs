use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::AppId;

/// `appIDs.txt`: the titles that get the fix button.
///
/// The file is re-read on every query so edits apply without a restart. When
/// it is missing, unreadable or lists no ids, every title is supported.
#[derive(Clone, Debug)]
pub struct SupportedApps {
    path: PathBuf,
}

impl SupportedApps {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` means "no restriction".
    pub fn load(&self) -> Option<HashSet<i64>> {
        if !self.path.exists() {
            tracing::info!("appIDs.txt not found, button will show for all games");
            return None;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let ids = parse_supported_ids(&content);
                tracing::info!("Loaded {} supported AppIDs from appIDs.txt", ids.len());
                (!ids.is_empty()).then_some(ids)
            }
            Err(err) => {
                tracing::warn!("Error reading appIDs.txt: {}", err);
                None
            }
        }
    }

    pub fn is_supported(&self, app_id: AppId) -> bool {
        let supported = match self.load() {
            Some(ids) => ids.contains(&i64::from(app_id.get())),
            None => true,
        };
        tracing::info!("is_appid_supported({}) -> {}", app_id, supported);
        supported
    }
}

/// Blank lines and `#` comments are skipped; lines that are not integers are
/// logged and skipped.
pub fn parse_supported_ids(content: &str) -> HashSet<i64> {
    let mut ids = HashSet::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<i64>() {
            Ok(id) => {
                ids.insert(id);
            }
            Err(_) => tracing::warn!("Invalid AppID in appIDs.txt: {}", line),
        }
    }
    ids
}
