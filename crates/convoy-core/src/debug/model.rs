use crate::text::truncate_chars;
use crate::timestamp::now_timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the `message` field, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Severity of a debug entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebugLevel {
    Info,
    Success,
    Warning,
    Error,
    /// Outcome of a worker compliance check.
    Compliance,
}

impl DebugLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugLevel::Info => "INFO",
            DebugLevel::Success => "SUCCESS",
            DebugLevel::Warning => "WARNING",
            DebugLevel::Error => "ERROR",
            DebugLevel::Compliance => "COMPLIANCE",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(DebugLevel::Info),
            "SUCCESS" => Ok(DebugLevel::Success),
            "WARNING" => Ok(DebugLevel::Warning),
            "ERROR" => Ok(DebugLevel::Error),
            "COMPLIANCE" => Ok(DebugLevel::Compliance),
            other => Err(format!("unknown debug level: {}", other)),
        }
    }
}

/// One immutable record of `DEBUG.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub timestamp: String,
    pub level: DebugLevel,
    pub agent: String,
    /// At most `MAX_MESSAGE_CHARS` characters
    pub message: String,
    /// Opaque structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl DebugEntry {
    pub fn new(
        level: DebugLevel,
        agent: impl Into<String>,
        message: &str,
        context: Option<Value>,
    ) -> Self {
        Self {
            timestamp: now_timestamp(),
            level,
            agent: agent.into(),
            message: truncate_chars(message, MAX_MESSAGE_CHARS),
            context,
        }
    }
}
