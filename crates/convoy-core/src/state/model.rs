//! State document domain models.
//!
//! `STATE.json` is shared by every worker of a session and the coordinator.
//! The typed models here describe the expected schema; the store itself works
//! on `serde_json::Value` so that merges and validation also apply to
//! documents that drift from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema version written into new and recovered documents.
pub const STATE_VERSION: &str = "1.0";

/// Lifecycle status of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Announced by the coordinator but not started yet.
    Planned,
    /// Process launched, no progress reported yet.
    Spawning,
    /// Reporting progress; subject to heartbeat monitoring.
    Active,
    Completed,
    Failed,
}

impl WorkerStatus {
    pub const ALL: [WorkerStatus; 5] = [
        WorkerStatus::Planned,
        WorkerStatus::Spawning,
        WorkerStatus::Active,
        WorkerStatus::Completed,
        WorkerStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Planned => "planned",
            WorkerStatus::Spawning => "spawning",
            WorkerStatus::Active => "active",
            WorkerStatus::Completed => "completed",
            WorkerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkerStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown worker status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerMetrics {
    #[serde(default)]
    pub events_logged: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-worker entry of `worker_states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState {
    pub status: WorkerStatus,
    pub task: String,
    pub spawned_at: String,
    #[serde(default)]
    pub last_heartbeat: Option<String>,
    #[serde(default)]
    pub metrics: WorkerMetrics,
    /// Output name → artifact path or value
    #[serde(default)]
    pub outputs: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkerState {
    /// A freshly launched worker.
    pub fn spawning(task: impl Into<String>, at: impl Into<String>) -> Self {
        let at = at.into();
        Self {
            status: WorkerStatus::Spawning,
            task: task.into(),
            spawned_at: at.clone(),
            last_heartbeat: Some(at),
            metrics: WorkerMetrics::default(),
            outputs: Map::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateTimestamps {
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_heartbeat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinationStatus {
    #[serde(default)]
    pub workers_spawned: Vec<String>,
    #[serde(default)]
    pub workers_completed: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provenance of a document rebuilt from the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryInfo {
    pub source: String,
    pub events_replayed: usize,
    pub lines_skipped: usize,
}

/// The single mutable document of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: String,
    pub session_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamps: StateTimestamps,
    #[serde(default)]
    pub coordination_status: CoordinationStatus,
    /// Kept untyped: validation has to see entries that violate the schema.
    #[serde(default)]
    pub worker_states: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery: Option<RecoveryInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateDocument {
    /// A new, empty document for a session created at `created_at`.
    pub fn new(session_id: impl Into<String>, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            version: STATE_VERSION.to_string(),
            session_id: session_id.into(),
            created_at: Some(created_at.clone()),
            description: None,
            timestamps: StateTimestamps {
                updated_at: Some(created_at.clone()),
                last_heartbeat: Some(created_at),
            },
            coordination_status: CoordinationStatus::default(),
            worker_states: BTreeMap::new(),
            recovery: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_document_shape() {
        let doc = StateDocument::new("2025-08-31-14-30-x", "2025-08-31T14:30:00Z");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["version"], STATE_VERSION);
        assert_eq!(value["timestamps"]["updated_at"], "2025-08-31T14:30:00Z");
        assert_eq!(value["coordination_status"]["workers_spawned"], json!([]));
        assert_eq!(value["worker_states"], json!({}));
        assert!(value.get("recovery").is_none());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let value = json!({
            "version": "1.0",
            "session_id": "2025-08-31-14-30-x",
            "phase": "review",
            "coordination_status": {"workers_spawned": [], "workers_completed": [], "lead": "c"}
        });
        let doc: StateDocument = serde_json::from_value(value).unwrap();
        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["phase"], "review");
        assert_eq!(back["coordination_status"]["lead"], "c");
    }

    #[test]
    fn test_worker_status_names() {
        for status in WorkerStatus::ALL {
            assert_eq!(status.as_str().parse::<WorkerStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_value(WorkerStatus::Active).unwrap(),
            json!("active")
        );
    }
}
