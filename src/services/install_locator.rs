use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppId;
use crate::utils::paths::home_join;
use crate::utils::vdf::{self, VdfError, VdfValue};

pub trait InstallLocator: Send + Sync {
    fn install_path(&self, app_id: AppId) -> Option<PathBuf>;

    fn is_installed(&self, app_id: AppId) -> bool {
        self.install_path(app_id).is_some()
    }
}

/// Finds games through Steam's `libraryfolders.vdf` and `appmanifest_*.acf`.
#[derive(Clone, Debug, Default)]
pub struct SteamLocator {
    steam_root: Option<PathBuf>,
}

impl SteamLocator {
    /// `steam_root` pins the Steam directory; `None` probes the usual places
    /// on every lookup.
    pub fn new(steam_root: Option<PathBuf>) -> Self {
        Self { steam_root }
    }

    pub fn steam_root(&self) -> Option<PathBuf> {
        match &self.steam_root {
            Some(root) => root.exists().then(|| root.clone()),
            None => steam_root_candidates().into_iter().find(|p| p.exists()),
        }
    }

    /// All `steamapps` directories, the main install first.
    pub fn library_folders(&self) -> Vec<PathBuf> {
        let Some(steam_root) = self.steam_root() else {
            return Vec::new();
        };

        let main = steam_root.join("steamapps");
        let mut folders = Vec::new();
        if main.is_dir() {
            folders.push(main.clone());
        }

        let library_file = main.join("libraryfolders.vdf");
        let Ok(content) = fs::read_to_string(&library_file) else {
            return folders;
        };

        match parse_library_paths(&content) {
            Ok(paths) => {
                for path in paths {
                    let steamapps = path.join("steamapps");
                    if steamapps.is_dir() && !folders.contains(&steamapps) {
                        folders.push(steamapps);
                    }
                }
            }
            Err(err) => tracing::warn!("Error reading library folders: {}", err),
        }

        folders
    }

    fn install_path_in(&self, steamapps: &Path, app_id: AppId) -> Option<PathBuf> {
        let manifest_file = steamapps.join(format!("appmanifest_{}.acf", app_id));
        let content = fs::read_to_string(&manifest_file).ok()?;
        let install_dir = match parse_install_dir(&content) {
            Ok(dir) => dir?,
            Err(err) => {
                tracing::warn!("Error reading manifest {}: {}", manifest_file.display(), err);
                return None;
            }
        };
        let game_path = steamapps.join("common").join(install_dir);
        game_path.is_dir().then_some(game_path)
    }
}

impl InstallLocator for SteamLocator {
    fn install_path(&self, app_id: AppId) -> Option<PathBuf> {
        self.library_folders()
            .iter()
            .find_map(|folder| self.install_path_in(folder, app_id))
    }
}

fn steam_root_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for key in ["ProgramFiles(x86)", "ProgramFiles"] {
        if let Some(dir) = std::env::var_os(key).filter(|v| !v.is_empty()) {
            candidates.push(PathBuf::from(dir).join("Steam"));
        }
    }
    candidates.extend(home_join(".steam/steam"));
    candidates.extend(home_join(".local/share/Steam"));
    candidates
}

/// Library roots listed in `libraryfolders.vdf`. Understands the current
/// nested layout (`"1" { "path" "D:\\Lib" }`) and the legacy flat one
/// (`"1" "D:\\Lib"`).
pub fn parse_library_paths(content: &str) -> Result<Vec<PathBuf>, VdfError> {
    let root = vdf::parse(content)?;
    let Some(folders) = root.get_block("libraryfolders") else {
        return Ok(Vec::new());
    };

    let paths = folders
        .iter()
        .filter_map(|(key, value)| match value {
            VdfValue::Block(entry) => entry.get_str("path").map(PathBuf::from),
            VdfValue::Str(path) if key.chars().all(|c| c.is_ascii_digit()) => {
                Some(PathBuf::from(path))
            }
            VdfValue::Str(_) => None,
        })
        .filter(|path| !path.as_os_str().is_empty())
        .collect();
    Ok(paths)
}

pub fn parse_install_dir(content: &str) -> Result<Option<String>, VdfError> {
    let root = vdf::parse(content)?;
    Ok(root
        .get_block("AppState")
        .and_then(|state| state.get_str("installdir"))
        .filter(|dir| !dir.is_empty())
        .map(str::to_string))
}
