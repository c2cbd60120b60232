use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};

use crate::errors::{BackendError, Result};
use crate::models::AppId;
use crate::utils::file::write_atomic;

/// Returned for titles that have no saved position.
pub const UNKNOWN_POSITION: f64 = -1.0;

/// Per-title button coordinates, persisted as `{"<app_id>": [x, y]}`.
///
/// Entries are kept as raw JSON so values this store cannot read (a `null`
/// left by an older backend, say) survive a rewrite untouched. Single
/// writer: `load` and `save` read or replace the whole file.
#[derive(Clone, Debug)]
pub struct PositionStore {
    path: PathBuf,
    positions: Map<String, Value>,
    // Set while the file on disk could not be read; `save` refuses to
    // replace it until a later `load` succeeds.
    read_only: bool,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            positions: Map::new(),
            read_only: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Replaces the in-memory map with the file contents. A missing file
    /// leaves the store empty.
    ///
    /// If an existing file cannot be read as a JSON object the store stays
    /// empty and becomes read-only, so the file is never overwritten.
    pub fn load(&mut self) -> Result<()> {
        self.positions.clear();
        self.read_only = false;
        if !self.path.exists() {
            return Ok(());
        }
        let result = self.read_file();
        self.read_only = result.is_err();
        result
    }

    fn read_file(&mut self) -> Result<()> {
        let raw = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(positions) => {
                self.positions = positions;
                Ok(())
            }
            other => Err(BackendError::Config(format!(
                "{} holds {} instead of an object",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    pub fn save(&self) -> Result<()> {
        if self.read_only {
            return Err(BackendError::Config(format!(
                "{} could not be read; refusing to overwrite it",
                self.path.display()
            )));
        }
        let json = serde_json::to_vec(&self.positions)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    /// `None` when the title is unknown or its entry is not two numbers.
    pub fn get(&self, app_id: AppId) -> Option<[f64; 2]> {
        match self.positions.get(&app_id.to_string())? {
            Value::Array(pair) if pair.len() == 2 => Some([pair[0].as_f64()?, pair[1].as_f64()?]),
            _ => None,
        }
    }

    pub fn x(&self, app_id: AppId) -> f64 {
        self.get(app_id).map_or(UNKNOWN_POSITION, |[x, _]| x)
    }

    pub fn y(&self, app_id: AppId) -> f64 {
        self.get(app_id).map_or(UNKNOWN_POSITION, |[_, y]| y)
    }

    /// Records the position and writes the store straight away.
    pub fn set_xy(&mut self, app_id: AppId, x: f64, y: f64) -> Result<()> {
        let pair = Value::Array(vec![coordinate(x)?, coordinate(y)?]);
        self.positions.insert(app_id.to_string(), pair);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// Whole pixel values are written as integers, the way the UI sends them.
fn coordinate(value: f64) -> Result<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Ok(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| BackendError::Config(format!("coordinate {} is not a finite number", value)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
