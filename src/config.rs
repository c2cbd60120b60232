use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{BackendError, Result};

pub const CONFIG_FILE: &str = "config.json";
pub const POSITION_DB_FILE: &str = "pos-db.json";
pub const SUPPORTED_APPIDS_FILE: &str = "appIDs.txt";

pub const DEFAULT_FIX_BASE_URL: &str = "https://github.com/ShayneVi/OnlineFix/raw/main";
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct PluginConfig {
    pub context_menu: bool,
    pub show_button: bool,
    pub fix_base_url: String,
    pub download_timeout_secs: u64,
    pub notifications: bool,
    pub steam_path: Option<PathBuf>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            context_menu: true,
            show_button: true,
            fix_base_url: DEFAULT_FIX_BASE_URL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            notifications: true,
            steam_path: None,
        }
    }
}

impl PluginConfig {
    /// Reads `config.json` from `base_dir`. A missing file yields defaults,
    /// a malformed one is an error.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|err| BackendError::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let base = self.fix_base_url.trim();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(BackendError::Config(format!(
                "fix_base_url must be an http(s) URL, got {:?}",
                self.fix_base_url
            )));
        }
        Ok(())
    }

    /// `None` disables the client timeout entirely.
    pub fn download_timeout(&self) -> Option<Duration> {
        (self.download_timeout_secs > 0).then(|| Duration::from_secs(self.download_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PluginConfig::load(dir.path()).unwrap();
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.download_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"context_menu": false, "show_button": true}"#,
        )
        .unwrap();

        let config = PluginConfig::load(dir.path()).unwrap();
        assert!(!config.context_menu);
        assert!(config.show_button);
        assert_eq!(config.fix_base_url, DEFAULT_FIX_BASE_URL);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert!(matches!(
            PluginConfig::load(dir.path()),
            Err(BackendError::Config(_))
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"fix_base_url": "ftp://mirror"}"#,
        )
        .unwrap();
        assert!(PluginConfig::load(dir.path()).is_err());
    }
}
