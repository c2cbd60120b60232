use crate::backend::PluginBackend;
use crate::commands::position::AppIdArgs;

pub fn check_game_installed(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<bool, String> {
    Ok(backend.check_game_installed(args.app_id))
}

/// Empty string when the game cannot be located.
pub fn get_game_path(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<String, String> {
    Ok(backend.get_game_path(args.app_id))
}
