use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::PluginBackend;

pub mod fix;
pub mod game;
pub mod position;
pub mod settings;

/// Method names the UI may call. Callers may prefix them with `Backend.`.
pub const METHODS: &[&str] = &[
    "get_app_x",
    "get_app_y",
    "set_app_xy",
    "get_context_menu_enabled",
    "get_app_button_enabled",
    "check_game_installed",
    "get_game_path",
    "apply_online_fix",
    "is_appid_supported",
    "get_fix_status",
];

pub fn dispatch(backend: &dyn PluginBackend, method: &str, args: Value) -> Result<Value, String> {
    let name = method.strip_prefix("Backend.").unwrap_or(method);
    match name {
        "get_app_x" => respond(position::get_app_x(parse_args(args)?, backend)),
        "get_app_y" => respond(position::get_app_y(parse_args(args)?, backend)),
        "set_app_xy" => respond(position::set_app_xy(parse_args(args)?, backend)),
        "get_context_menu_enabled" => respond(settings::get_context_menu_enabled(backend)),
        "get_app_button_enabled" => respond(settings::get_app_button_enabled(backend)),
        "check_game_installed" => respond(game::check_game_installed(parse_args(args)?, backend)),
        "get_game_path" => respond(game::get_game_path(parse_args(args)?, backend)),
        "apply_online_fix" => respond(fix::apply_online_fix(parse_args(args)?, backend)),
        "is_appid_supported" => respond(fix::is_appid_supported(parse_args(args)?, backend)),
        "get_fix_status" => respond(fix::get_fix_status(parse_args(args)?, backend)),
        other => Err(format!("unknown method: {}", other)),
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|err| format!("invalid arguments: {}", err))
}

fn respond<T: Serialize>(result: Result<T, String>) -> Result<Value, String> {
    result.and_then(|value| serde_json::to_value(value).map_err(|err| err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppId, FixOutcome, FixStatus};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubBackend {
        calls: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PluginBackend for StubBackend {
        fn get_app_x(&self, _app_id: AppId) -> f64 {
            12.0
        }
        fn get_app_y(&self, _app_id: AppId) -> f64 {
            -1.0
        }
        fn set_app_xy(&self, app_id: AppId, pos_x: f64, pos_y: f64) -> crate::errors::Result<bool> {
            self.record(format!("set {} {} {}", app_id, pos_x, pos_y));
            Ok(true)
        }
        fn get_context_menu_enabled(&self) -> bool {
            true
        }
        fn get_app_button_enabled(&self) -> bool {
            false
        }
        fn check_game_installed(&self, app_id: AppId) -> bool {
            app_id.get() == 480
        }
        fn get_game_path(&self, _app_id: AppId) -> String {
            String::new()
        }
        fn apply_online_fix(&self, app_id: AppId, target_path: &str) -> FixOutcome {
            self.record(format!("apply {} {}", app_id, target_path));
            FixOutcome::applied(2, target_path)
        }
        fn is_appid_supported(&self, _app_id: AppId) -> bool {
            true
        }
        fn get_fix_status(&self, _app_id: AppId) -> Option<FixStatus> {
            None
        }
    }

    #[test]
    fn routes_prefixed_and_bare_names() {
        let backend = StubBackend::default();
        assert_eq!(
            dispatch(&backend, "Backend.get_app_x", json!({"app_id": 480})).unwrap(),
            json!(12.0)
        );
        assert_eq!(
            dispatch(&backend, "check_game_installed", json!({"app_id": "480"})).unwrap(),
            json!(true)
        );
        assert_eq!(
            dispatch(&backend, "get_app_button_enabled", Value::Null).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn apply_passes_through_outcome() {
        let backend = StubBackend::default();
        let result = dispatch(
            &backend,
            "Backend.apply_online_fix",
            json!({"app_id": 123, "target_path": "/games/x"}),
        )
        .unwrap();
        assert_eq!(
            result,
            json!({"success": true, "files_copied": 2, "target_path": "/games/x"})
        );
        assert_eq!(*backend.calls.lock().unwrap(), vec!["apply 123 /games/x".to_string()]);
    }

    #[test]
    fn set_xy_accepts_integer_coordinates() {
        let backend = StubBackend::default();
        let result = dispatch(
            &backend,
            "set_app_xy",
            json!({"app_id": 7, "pos_x": 100, "pos_y": 25.5}),
        )
        .unwrap();
        assert_eq!(result, json!(true));
        assert_eq!(*backend.calls.lock().unwrap(), vec!["set 7 100 25.5".to_string()]);
    }

    #[test]
    fn bad_calls_are_errors() {
        let backend = StubBackend::default();
        assert!(dispatch(&backend, "Backend.rm_rf", json!({}))
            .unwrap_err()
            .contains("unknown method"));
        assert!(dispatch(&backend, "get_app_x", json!({"app_id": 0}))
            .unwrap_err()
            .contains("invalid arguments"));
        assert!(dispatch(&backend, "apply_online_fix", json!({"app_id": 1}))
            .unwrap_err()
            .contains("invalid arguments"));
    }

    #[test]
    fn every_listed_method_is_routed() {
        let backend = StubBackend::default();
        for method in METHODS {
            let err = dispatch(&backend, method, json!({}));
            if let Err(message) = err {
                assert!(!message.contains("unknown method"), "{method} not routed");
            }
        }
    }
}
