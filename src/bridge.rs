use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::PluginBackend;
use crate::commands::dispatch;

#[derive(Debug, Deserialize)]
pub struct BridgeRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BridgeResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    fn from_result(id: Value, result: Result<Value, String>) -> Self {
        match result {
            Ok(value) => Self {
                id,
                result: Some(value),
                error: None,
            },
            Err(error) => Self {
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

pub fn handle_line(backend: &dyn PluginBackend, line: &str) -> BridgeResponse {
    match serde_json::from_str::<BridgeRequest>(line) {
        Ok(request) => {
            let result = dispatch(backend, &request.method, request.args);
            BridgeResponse::from_result(request.id, result)
        }
        Err(err) => BridgeResponse::from_result(Value::Null, Err(format!("malformed request: {}", err))),
    }
}

/// JSON-lines loop between the host shell and the backend: one request per
/// input line, one response per output line. Returns at end of input.
pub fn serve<R: BufRead, W: Write>(backend: &dyn PluginBackend, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(backend, &line);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AppState;
    use crate::config::PluginConfig;
    use crate::services::{MemoryNotifier, SteamLocator};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn serves_requests_in_order() {
        let base = tempfile::tempdir().unwrap();
        let backend = AppState::with_parts(
            base.path(),
            PluginConfig::default(),
            Arc::new(SteamLocator::new(Some(base.path().join("no-steam")))),
            Arc::new(MemoryNotifier::new()),
        )
        .unwrap();

        let input = concat!(
            "{\"id\": 1, \"method\": \"Backend.set_app_xy\", \"args\": {\"app_id\": 480, \"pos_x\": 3, \"pos_y\": 4}}\n",
            "\n",
            "{\"id\": 2, \"method\": \"Backend.get_app_y\", \"args\": {\"app_id\": 480}}\n",
            "not json\n",
            "{\"id\": \"x\", \"method\": \"get_game_path\", \"args\": {\"app_id\": 480}}\n",
        );
        let mut output = Vec::new();
        serve(&backend, input.as_bytes(), &mut output).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], json!({"id": 1, "result": true}));
        assert_eq!(lines[1], json!({"id": 2, "result": 4.0}));
        assert_eq!(lines[2]["id"], Value::Null);
        assert!(lines[2]["error"].as_str().unwrap().starts_with("malformed request"));
        assert_eq!(lines[3], json!({"id": "x", "result": ""}));
    }
}
