//! Backend Wire Types
//!
//! Request and response bodies exchanged with the moderation backend.
//! Field names follow the backend's JSON exactly (snake_case).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Key prefix the backend uses for per-layer results (`layer1`, `layer2`, ...).
pub const LAYER_KEY_PREFIX: &str = "layer";

/// Default user id used by the dashboard when none is configured.
pub const DEFAULT_USER_ID: &str = "demo_user_01";

/// Body of `POST /api/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub message: String,
    pub user_id: String,
}

impl ProcessRequest {
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
        }
    }
}

/// One layer's authoritative result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerResult {
    pub passed: bool,
    #[serde(default)]
    pub message: String,
    /// Free-form layer details (flags, scores, armoring token).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl LayerResult {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: serde_json::Value::Null,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: serde_json::Value::Null,
        }
    }

    /// Backend message, or "Passed"/"Blocked" when the backend left it empty.
    pub fn display_message(&self) -> &str {
        if !self.message.trim().is_empty() {
            &self.message
        } else if self.passed {
            "Passed"
        } else {
            "Blocked"
        }
    }
}

/// Unordered per-layer results, keyed `layer1`..`layerN`.
pub type LayerMap = HashMap<String, LayerResult>;

/// Parse a `layerK` key into its 1-based index.
pub fn parse_layer_key(key: &str) -> CoreResult<usize> {
    let digits = key
        .strip_prefix(LAYER_KEY_PREFIX)
        .ok_or_else(|| CoreError::parse(format!("unrecognized layer key: {}", key)))?;
    match digits.parse::<usize>() {
        Ok(index) if index >= 1 => Ok(index),
        _ => Err(CoreError::parse(format!("invalid layer index in key: {}", key))),
    }
}

/// Build the canonical key for a 1-based layer index.
pub fn layer_key(index: usize) -> String {
    format!("{}{}", LAYER_KEY_PREFIX, index)
}

/// A single backend-side log line, as returned alongside a process response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendLogLine {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
}

/// Body returned by `POST /api/process`.
///
/// `message` carries the model reply when `success` is true and the block
/// reason when it is false. Some backend error paths use `error` instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<BackendLogLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<LayerMap>,
}

impl ProcessResponse {
    /// The user-visible text of the response: `message`, falling back to `error`.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Block reason for a `success = false` response.
    pub fn block_reason(&self) -> String {
        self.text()
            .map(str::to_string)
            .unwrap_or_else(|| "Request blocked by security policy".to_string())
    }

    /// Layer map, only when non-empty.
    pub fn layer_results(&self) -> Option<&LayerMap> {
        self.layers.as_ref().filter(|layers| !layers.is_empty())
    }
}

/// One recent conversation preview from `GET /api/conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPreview {
    pub preview: String,
    pub timestamp: String,
    #[serde(default)]
    pub user_id: String,
}

/// Body of `GET /api/conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub conversations: Vec<ConversationPreview>,
}

/// A scored profile event recorded by the backend's user profiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    pub event: String,
    pub time: String,
    pub score: i64,
}

/// Body of `GET /api/user-status/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub status: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub events: Vec<UserEvent>,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self {
            status: "LOW_RISK".to_string(),
            score: 0,
            banned: false,
            events: Vec::new(),
        }
    }
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub layers: String,
}
