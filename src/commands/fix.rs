use serde::Deserialize;

use crate::backend::PluginBackend;
use crate::commands::position::AppIdArgs;
use crate::models::{AppId, FixOutcome, FixStatus};

#[derive(Clone, Debug, Deserialize)]
pub struct ApplyFixArgs {
    pub app_id: AppId,
    pub target_path: String,
}

pub fn apply_online_fix(args: ApplyFixArgs, backend: &dyn PluginBackend) -> Result<FixOutcome, String> {
    Ok(backend.apply_online_fix(args.app_id, &args.target_path))
}

pub fn is_appid_supported(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<bool, String> {
    Ok(backend.is_appid_supported(args.app_id))
}

pub fn get_fix_status(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<Option<FixStatus>, String> {
    Ok(backend.get_fix_status(args.app_id))
}
