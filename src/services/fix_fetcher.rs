use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::errors::{BackendError, FixError, Result};
use crate::models::AppId;
use crate::utils::file::file_sha256;

#[derive(Clone, Debug)]
pub struct FetchedArchive {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Remote repository of fix archives, one `<app_id>.zip` per title.
#[derive(Clone)]
pub struct FixSource {
    client: Client,
    base_url: String,
}

impl FixSource {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("onlinefix-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn archive_url(&self, app_id: AppId) -> String {
        archive_url(&self.base_url, app_id)
    }

    /// Downloads the fix archive for `app_id` into `workspace`.
    ///
    /// A single attempt is made. HTTP 404 maps to [`FixError::NotFound`];
    /// every other network failure or non-success status is
    /// [`FixError::Transport`].
    pub fn fetch(&self, app_id: AppId, workspace: &Path) -> std::result::Result<FetchedArchive, FixError> {
        let url = self.archive_url(app_id);
        tracing::info!("Downloading fix from: {}", url);

        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| FixError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FixError::NotFound(app_id));
        }
        if !status.is_success() {
            return Err(FixError::Transport(format!("HTTP {} for {}", status, url)));
        }

        let dest = workspace.join(format!("{}.zip", app_id));
        let mut file = File::create(&dest).map_err(|err| FixError::filesystem(&dest, err))?;
        let size_bytes = response
            .copy_to(&mut file)
            .map_err(|err| FixError::Transport(err.to_string()))?;
        drop(file);

        let sha256 = file_sha256(&dest).map_err(|err| FixError::filesystem(&dest, err))?;
        tracing::info!(
            "Downloaded to: {} ({} bytes, sha256 {})",
            dest.display(),
            size_bytes,
            sha256
        );

        Ok(FetchedArchive {
            path: dest,
            size_bytes,
            sha256,
        })
    }
}

pub fn archive_url(base_url: &str, app_id: AppId) -> String {
    format!("{}/{}.zip", base_url.trim_end_matches('/'), app_id)
}
