use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Heartbeat age after which an active worker is reported as stale.
pub const DEFAULT_HEARTBEAT_TIMEOUT_SECS: u64 = 300;

/// How the storage layer serializes writers on a shared file.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockStrategy {
    /// Take an exclusive advisory lock; degrade with a warning if the host
    /// filesystem does not support one.
    #[default]
    Advisory,
    /// Never lock. Writes stay whole but concurrent writers are not excluded.
    Disabled,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Directory holding one subdirectory per session.
    pub sessions_root: PathBuf,
    pub heartbeat_timeout_secs: u64,
    pub lock_strategy: LockStrategy,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            sessions_root: PathBuf::from("sessions"),
            heartbeat_timeout_secs: DEFAULT_HEARTBEAT_TIMEOUT_SECS,
            lock_strategy: LockStrategy::Advisory,
        }
    }
}

impl CoordinationConfig {
    pub fn with_sessions_root(sessions_root: impl Into<PathBuf>) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            ..Self::default()
        }
    }
}
