use crate::backend::PluginBackend;

pub fn get_context_menu_enabled(backend: &dyn PluginBackend) -> Result<bool, String> {
    Ok(backend.get_context_menu_enabled())
}

pub fn get_app_button_enabled(backend: &dyn PluginBackend) -> Result<bool, String> {
    Ok(backend.get_app_button_enabled())
}
