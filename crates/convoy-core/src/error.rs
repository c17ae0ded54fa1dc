//! Error types for the Convoy coordination core.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A shared error type for the entire Convoy workspace.
///
/// Storage-level failures carry the offending path as a string so the error
/// stays `Clone` and serializable, the same way `Io` stringifies the
/// underlying `std::io::Error`.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ConvoyError {
    /// The session directory does not exist.
    #[error("Session not found: '{session_id}'")]
    SessionNotFound { session_id: String },

    /// The session directory exists but holds no state document.
    #[error("Session not found: '{session_id}' has no state document at {path}")]
    StateMissing { session_id: String, path: String },

    /// The state document exists but could not be parsed.
    #[error("Corrupt state document at {path}: {message}")]
    CorruptState { path: String, message: String },

    /// A state document already exists where a new one was about to be created.
    #[error("Session already exists: '{session_id}'")]
    SessionAlreadyExists { session_id: String },

    /// The session ID does not match `YYYY-MM-DD-HH-mm-<slug>`.
    #[error("Invalid session id: '{0}'")]
    InvalidSessionId(String),

    /// The event log could not be opened or read at all.
    #[error("Event log unavailable at {path}: {message}")]
    EventLogUnavailable { path: String, message: String },

    /// A state patch was not a JSON object.
    #[error("Invalid state patch: {0}")]
    InvalidPatch(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// File locking error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvoyError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a SessionNotFound error
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Creates a StateMissing error
    pub fn state_missing(session_id: impl Into<String>, path: &Path) -> Self {
        Self::StateMissing {
            session_id: session_id.into(),
            path: path.display().to_string(),
        }
    }

    /// Creates a CorruptState error
    pub fn corrupt_state(path: &Path, message: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Creates an EventLogUnavailable error
    pub fn event_log_unavailable(path: &Path, message: impl Into<String>) -> Self {
        Self::EventLogUnavailable {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True when the session or its state document is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound { .. } | Self::StateMissing { .. }
        )
    }

    /// True when the state document should be rebuilt from the event log.
    ///
    /// A missing session directory is not recoverable: there is no event log
    /// to replay either.
    pub fn needs_recovery(&self) -> bool {
        matches!(self, Self::StateMissing { .. } | Self::CorruptState { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ConvoyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ConvoyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ConvoyError>`.
pub type Result<T> = std::result::Result<T, ConvoyError>;
