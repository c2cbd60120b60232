use std::path::{Path, PathBuf};

pub const BASE_DIR_ENV: &str = "ONLINEFIX_BASE_DIR";
pub const LOG_DIR_ENV: &str = "ONLINEFIX_LOG_DIR";

fn ensure_dir(path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if std::fs::create_dir_all(path).is_ok() {
        return Some(path.to_path_buf());
    }
    None
}

fn dir_from_env(key: &str) -> Option<PathBuf> {
    let value = std::env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    ensure_dir(&PathBuf::from(trimmed))
}

/// Directory holding `config.json`, `pos-db.json` and `appIDs.txt`.
pub fn resolve_base_dir() -> PathBuf {
    if let Some(dir) = dir_from_env(BASE_DIR_ENV) {
        return dir;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.to_path_buf();
        }
    }

    PathBuf::from(".")
}

pub fn resolve_log_dir(base_dir: &Path) -> PathBuf {
    if let Some(dir) = dir_from_env(LOG_DIR_ENV) {
        return dir;
    }

    let base_logs = base_dir.join("logs");
    if let Some(found) = ensure_dir(&base_logs) {
        return found;
    }

    std::env::temp_dir().join("onlinefix-logs")
}

/// Home-relative path, `None` when no home directory is known.
pub fn home_join(relative: &str) -> Option<PathBuf> {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
    if home.is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(relative))
}
