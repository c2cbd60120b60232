use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use crate::errors::FixError;
use crate::models::{AppId, FixOutcome, FixStage, FixStatus};
use crate::services::fix_fetcher::FixSource;
use crate::services::notifier::Notifier;
use crate::services::{fix_unpacker, merge_applier};

const TITLE: &str = "OnlineFix";
const TITLE_ERROR: &str = "OnlineFix - Error";
const TITLE_SUCCESS: &str = "OnlineFix - Success!";
const START_TIMEOUT: Duration = Duration::from_secs(3);
const RESULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives fetch → unpack → merge for one title at a time.
///
/// Each call owns a fresh temporary workspace that is removed before the call
/// returns, whatever happened in between. Failures never escape as errors or
/// panics; they come back as `FixOutcome { success: false, .. }`.
#[derive(Clone)]
pub struct FixManager {
    source: FixSource,
    notifier: Arc<dyn Notifier>,
    workspace_root: Option<PathBuf>,
    status_cache: Arc<Mutex<HashMap<AppId, FixStatus>>>,
    #[cfg(test)]
    panic_at: Option<FixStage>,
}

impl FixManager {
    pub fn new(source: FixSource, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            workspace_root: None,
            status_cache: Arc::new(Mutex::new(HashMap::new())),
            #[cfg(test)]
            panic_at: None,
        }
    }

    /// Creates workspaces under `root` instead of the system temp dir.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn source(&self) -> &FixSource {
        &self.source
    }

    pub fn apply_fix(&self, app_id: AppId, target_path: &Path) -> FixOutcome {
        tracing::info!("apply_fix({}, {})", app_id, target_path.display());
        if target_path.as_os_str().is_empty() {
            return self.fail(app_id, "No target path given".to_string());
        }

        let workspace = match self.create_workspace(app_id) {
            Ok(workspace) => workspace,
            Err(err) => return self.fail(app_id, err.to_string()),
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_pipeline(app_id, target_path, workspace.path())
        }));

        let workspace_path = workspace.path().to_path_buf();
        if let Err(err) = workspace.close() {
            tracing::warn!(
                "Failed to remove temporary workspace {}: {}",
                workspace_path.display(),
                err
            );
        }

        match result {
            Ok(Ok(files_copied)) => self.succeed(app_id, files_copied, target_path),
            Ok(Err(err)) => {
                tracing::debug!("fix for {} failed with {:?}", app_id, err.kind());
                self.fail(app_id, err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Error in apply_fix for {}: {}", app_id, message);
                self.fail(app_id, format!("Error: {}", message))
            }
        }
    }

    pub fn status(&self, app_id: AppId) -> Option<FixStatus> {
        self.status_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&app_id).cloned())
    }

    fn run_pipeline(
        &self,
        app_id: AppId,
        target_path: &Path,
        workspace: &Path,
    ) -> Result<u64, FixError> {
        self.enter_stage(app_id, FixStage::Fetching);
        self.notify(
            TITLE,
            &format!("Downloading fix for AppID {}...", app_id),
            START_TIMEOUT,
        );
        let archive = self.source.fetch(app_id, workspace)?;

        self.enter_stage(app_id, FixStage::Unpacking);
        let payload_root = fix_unpacker::unpack(&archive.path, workspace, app_id)?;

        self.enter_stage(app_id, FixStage::Merging);
        merge_applier::apply(&payload_root, target_path)
    }

    fn enter_stage(&self, app_id: AppId, stage: FixStage) {
        self.set_status(app_id, stage, None, 0);
        #[cfg(test)]
        if self.panic_at == Some(stage) {
            panic!("injected failure while {:?}", stage);
        }
    }

    fn create_workspace(&self, app_id: AppId) -> Result<TempDir, FixError> {
        let prefix = format!("onlinefix_{}_", app_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let workspace = match &self.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(FixError::Workspace)?;
        tracing::debug!("workspace for {}: {}", app_id, workspace.path().display());
        Ok(workspace)
    }

    fn succeed(&self, app_id: AppId, files_copied: u64, target_path: &Path) -> FixOutcome {
        let message = format!("Successfully applied! {} files copied.", files_copied);
        tracing::info!("{}", message);
        self.set_status(app_id, FixStage::Done, Some(message.clone()), files_copied);
        self.notify(TITLE_SUCCESS, &message, RESULT_TIMEOUT);
        FixOutcome::applied(files_copied, target_path.to_string_lossy())
    }

    fn fail(&self, app_id: AppId, message: String) -> FixOutcome {
        tracing::error!("ERROR: {}", message);
        self.set_status(app_id, FixStage::Failed, Some(message.clone()), 0);
        self.notify(TITLE_ERROR, &message, RESULT_TIMEOUT);
        FixOutcome::failed(message)
    }

    fn notify(&self, title: &str, message: &str, timeout: Duration) {
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
            self.notifier.notify(title, message, timeout)
        }));
        match delivered {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("Failed to show notification: {}", err),
            Err(payload) => tracing::warn!(
                "Notifier panicked: {}",
                panic_message(payload.as_ref())
            ),
        }
    }

    fn set_status(&self, app_id: AppId, stage: FixStage, message: Option<String>, files_copied: u64) {
        if let Ok(mut cache) = self.status_cache.lock() {
            cache.insert(
                app_id,
                FixStatus {
                    app_id,
                    stage,
                    message,
                    files_copied,
                },
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unexpected internal error".to_string()
    }
}
