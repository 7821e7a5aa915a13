//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineSnapshot, PlayerColor};

/// Response for every intent endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    /// "applied" or "ignored"
    pub status: String,
    pub action: String,
    pub applied: bool,
    pub reset_pending: bool,
    pub timestamp: DateTime<Utc>,
    pub state: EngineSnapshot,
}

impl IntentResponse {
    pub fn new(action: &str, applied: bool, reset_pending: bool, state: EngineSnapshot) -> Self {
        Self {
            status: if applied { "applied" } else { "ignored" }.to_string(),
            action: action.to_string(),
            applied,
            reset_pending,
            timestamp: Utc::now(),
            state,
        }
    }
}

/// Full status with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: EngineSnapshot,
    pub reset_pending: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Time entry as typed into a numeric field; numbers are accepted too
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    Text(String),
    Number(serde_json::Number),
}

impl TimeInput {
    pub fn into_raw(self) -> String {
        match self {
            TimeInput::Text(text) => text,
            TimeInput::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeRequest {
    pub seconds: TimeInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorRequest {
    pub color: PlayerColor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TogglesRequest {
    #[serde(default)]
    pub reverse_enabled: Option<bool>,
    #[serde(default)]
    pub skip_enabled: Option<bool>,
}
