use serde::Deserialize;

use crate::backend::PluginBackend;
use crate::models::AppId;

#[derive(Clone, Debug, Deserialize)]
pub struct AppIdArgs {
    pub app_id: AppId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SetPositionArgs {
    pub app_id: AppId,
    pub pos_x: f64,
    pub pos_y: f64,
}

pub fn get_app_x(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<f64, String> {
    Ok(backend.get_app_x(args.app_id))
}

pub fn get_app_y(args: AppIdArgs, backend: &dyn PluginBackend) -> Result<f64, String> {
    Ok(backend.get_app_y(args.app_id))
}

pub fn set_app_xy(args: SetPositionArgs, backend: &dyn PluginBackend) -> Result<bool, String> {
    backend
        .set_app_xy(args.app_id, args.pos_x, args.pos_y)
        .map_err(|err| err.to_string())
}
