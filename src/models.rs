use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Steam application id. Always positive; the decimal form names the remote
/// archive, the downloaded file and the optional payload folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawAppId", into = "u32")]
pub struct AppId(u32);

impl AppId {
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppId> for u32 {
    fn from(value: AppId) -> Self {
        value.0
    }
}

impl FromStr for AppId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u32 = trimmed
            .parse()
            .map_err(|_| format!("invalid app id: {trimmed:?}"))?;
        Self::new(value).ok_or_else(|| "app id must be positive".to_string())
    }
}

// The UI sends numbers, older hosts sent strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAppId {
    Number(u64),
    Text(String),
}

impl TryFrom<RawAppId> for AppId {
    type Error = String;

    fn try_from(raw: RawAppId) -> Result<Self, Self::Error> {
        match raw {
            RawAppId::Number(value) => u32::try_from(value)
                .ok()
                .and_then(AppId::new)
                .ok_or_else(|| format!("app id out of range: {value}")),
            RawAppId::Text(text) => text.parse(),
        }
    }
}

/// Result of one `apply_online_fix` call, shaped for the UI.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FixOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_copied: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FixOutcome {
    pub fn applied(files_copied: u64, target_path: impl Into<String>) -> Self {
        Self {
            success: true,
            files_copied: Some(files_copied),
            target_path: Some(target_path.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            files_copied: None,
            target_path: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixStage {
    Fetching,
    Unpacking,
    Merging,
    Done,
    Failed,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct FixStatus {
    pub app_id: AppId,
    pub stage: FixStage,
    pub message: Option<String>,
    pub files_copied: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_accepts_numbers_and_strings() {
        let from_number: AppId = serde_json::from_str("480").unwrap();
        let from_text: AppId = serde_json::from_str("\" 480 \"").unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(from_number.to_string(), "480");
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "480");
    }

    #[test]
    fn app_id_rejects_zero_and_garbage() {
        assert!(serde_json::from_str::<AppId>("0").is_err());
        assert!(serde_json::from_str::<AppId>("-5").is_err());
        assert!(serde_json::from_str::<AppId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<AppId>("4294967296").is_err());
    }

    #[test]
    fn outcome_serializes_only_relevant_fields() {
        let ok = serde_json::to_value(FixOutcome::applied(2, "/games/x")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"success": true, "files_copied": 2, "target_path": "/games/x"})
        );

        let failed = serde_json::to_value(FixOutcome::failed("boom")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "boom"}));
    }
}
