use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{PluginConfig, POSITION_DB_FILE, SUPPORTED_APPIDS_FILE};
use crate::errors::{BackendError, Result};
use crate::models::{AppId, FixOutcome, FixStatus};
use crate::services::position_store::UNKNOWN_POSITION;
use crate::services::{
    default_notifier, FixManager, FixSource, InstallLocator, Notifier, PositionStore,
    SteamLocator, SupportedApps,
};

const TITLE_ERROR: &str = "OnlineFix - Error";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(4);

/// Operations the UI can call by name. The host binds method names to this
/// trait (see [`crate::commands::dispatch`]).
pub trait PluginBackend: Send + Sync {
    fn get_app_x(&self, app_id: AppId) -> f64;
    fn get_app_y(&self, app_id: AppId) -> f64;
    fn set_app_xy(&self, app_id: AppId, pos_x: f64, pos_y: f64) -> Result<bool>;
    fn get_context_menu_enabled(&self) -> bool;
    fn get_app_button_enabled(&self) -> bool;
    fn check_game_installed(&self, app_id: AppId) -> bool;
    fn get_game_path(&self, app_id: AppId) -> String;
    fn apply_online_fix(&self, app_id: AppId, target_path: &str) -> FixOutcome;
    fn is_appid_supported(&self, app_id: AppId) -> bool;
    fn get_fix_status(&self, app_id: AppId) -> Option<FixStatus>;
}

pub struct AppState {
    base_dir: PathBuf,
    config: PluginConfig,
    positions: Mutex<PositionStore>,
    supported: SupportedApps,
    locator: Arc<dyn InstallLocator>,
    notifier: Arc<dyn Notifier>,
    fixes: FixManager,
}

impl AppState {
    /// Builds the backend from `base_dir` with the platform notifier and the
    /// Steam locator.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let config = PluginConfig::load(base_dir)?;
        let notifier = default_notifier(config.notifications);
        let locator: Arc<dyn InstallLocator> =
            Arc::new(SteamLocator::new(config.steam_path.clone()));
        Self::with_parts(base_dir, config, locator, notifier)
    }

    pub fn with_parts(
        base_dir: &Path,
        config: PluginConfig,
        locator: Arc<dyn InstallLocator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        tracing::info!("Plugin base dir: {}", base_dir.display());

        let source = FixSource::new(&config.fix_base_url, config.download_timeout())?;
        let fixes = FixManager::new(source, notifier.clone());

        let mut positions = PositionStore::new(base_dir.join(POSITION_DB_FILE));
        match positions.load() {
            Ok(()) => tracing::info!("Database loaded ({} entries)", positions.len()),
            Err(err) => tracing::warn!(
                "Could not load {}, positions will not be saved this session: {}",
                positions.path().display(),
                err
            ),
        }

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            supported: SupportedApps::new(base_dir.join(SUPPORTED_APPIDS_FILE)),
            positions: Mutex::new(positions),
            config,
            locator,
            notifier,
            fixes,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn fixes(&self) -> &FixManager {
        &self.fixes
    }

    /// Flushes the position store. Called by the host on shutdown.
    pub fn unload(&self) -> Result<()> {
        let positions = self.positions()?;
        if positions.is_read_only() {
            tracing::warn!("Leaving unreadable {} untouched", positions.path().display());
            return Ok(());
        }
        positions.save()?;
        tracing::info!("Database saved");
        Ok(())
    }

    fn positions(&self) -> Result<std::sync::MutexGuard<'_, PositionStore>> {
        self.positions
            .lock()
            .map_err(|_| BackendError::Config("position store lock poisoned".to_string()))
    }

    // config.json may be edited while the host is running.
    fn current_config(&self) -> PluginConfig {
        PluginConfig::load(&self.base_dir).unwrap_or_else(|err| {
            tracing::warn!("Falling back to startup config: {}", err);
            self.config.clone()
        })
    }

    fn notify_error(&self, message: &str) {
        if let Err(err) = self.notifier.notify(TITLE_ERROR, message, LOOKUP_TIMEOUT) {
            tracing::warn!("Failed to show notification: {}", err);
        }
    }
}

impl PluginBackend for AppState {
    fn get_app_x(&self, app_id: AppId) -> f64 {
        let pos_x = self
            .positions()
            .map(|store| store.x(app_id))
            .unwrap_or(UNKNOWN_POSITION);
        tracing::info!("get_app_x({}) -> {}", app_id, pos_x);
        pos_x
    }

    fn get_app_y(&self, app_id: AppId) -> f64 {
        let pos_y = self
            .positions()
            .map(|store| store.y(app_id))
            .unwrap_or(UNKNOWN_POSITION);
        tracing::info!("get_app_y({}) -> {}", app_id, pos_y);
        pos_y
    }

    fn set_app_xy(&self, app_id: AppId, pos_x: f64, pos_y: f64) -> Result<bool> {
        tracing::info!("set_app_xy({}, {}, {})", app_id, pos_x, pos_y);
        self.positions()?.set_xy(app_id, pos_x, pos_y)?;
        Ok(true)
    }

    fn get_context_menu_enabled(&self) -> bool {
        let enabled = self.current_config().context_menu;
        tracing::info!("get_context_menu_enabled() -> {}", enabled);
        enabled
    }

    fn get_app_button_enabled(&self) -> bool {
        let enabled = self.current_config().show_button;
        tracing::info!("get_app_button_enabled() -> {}", enabled);
        enabled
    }

    fn check_game_installed(&self, app_id: AppId) -> bool {
        let installed = self.locator.is_installed(app_id);
        tracing::info!("check_game_installed({}) -> {}", app_id, installed);
        if !installed {
            self.notify_error("Game is not installed. Please install it first.");
        }
        installed
    }

    fn get_game_path(&self, app_id: AppId) -> String {
        let path = self.locator.install_path(app_id);
        tracing::info!("get_game_path({}) -> {:?}", app_id, path);
        match path {
            Some(path) => path.to_string_lossy().into_owned(),
            None => {
                self.notify_error("Could not find game installation path.");
                String::new()
            }
        }
    }

    fn apply_online_fix(&self, app_id: AppId, target_path: &str) -> FixOutcome {
        tracing::info!("apply_online_fix({}, {})", app_id, target_path);
        let target_path = if target_path.trim().is_empty() { "" } else { target_path };
        self.fixes.apply_fix(app_id, Path::new(target_path))
    }

    fn is_appid_supported(&self, app_id: AppId) -> bool {
        self.supported.is_supported(app_id)
    }

    fn get_fix_status(&self, app_id: AppId) -> Option<FixStatus> {
        self.fixes.status(app_id)
    }
}
