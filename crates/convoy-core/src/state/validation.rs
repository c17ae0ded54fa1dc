//! Schema checks for worker entries of a state document.

use super::model::WorkerStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields every worker entry must carry.
pub const REQUIRED_WORKER_FIELDS: [&str; 3] = ["status", "task", "spawned_at"];

/// Per-check breakdown of `validate_worker_state`.
///
/// The two `completed_*` checks pass vacuously for workers that have not
/// completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerValidation {
    pub required_fields: bool,
    pub missing_fields: Vec<String>,
    pub valid_status: bool,
    pub completed_has_events: bool,
    pub completed_has_outputs: bool,
}

impl WorkerValidation {
    pub fn passed(&self) -> bool {
        self.required_fields
            && self.valid_status
            && self.completed_has_events
            && self.completed_has_outputs
    }

    /// Names of the checks that did not hold.
    pub fn failed_checks(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.required_fields {
            failed.push("required_fields");
        }
        if !self.valid_status {
            failed.push("valid_status");
        }
        if !self.completed_has_events {
            failed.push("completed_has_events");
        }
        if !self.completed_has_outputs {
            failed.push("completed_has_outputs");
        }
        failed
    }
}

/// Checks one `worker_states` entry against the worker schema.
pub fn validate_worker_state(worker_state: &Value) -> WorkerValidation {
    let missing_fields: Vec<String> = REQUIRED_WORKER_FIELDS
        .iter()
        .filter(|field| worker_state.get(**field).is_none_or(Value::is_null))
        .map(|field| field.to_string())
        .collect();

    let status = worker_state
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<WorkerStatus>().ok());
    let completed = status == Some(WorkerStatus::Completed);

    let events_logged = worker_state
        .pointer("/metrics/events_logged")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let has_outputs = match worker_state.get("outputs") {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        _ => false,
    };

    WorkerValidation {
        required_fields: missing_fields.is_empty(),
        missing_fields,
        valid_status: status.is_some(),
        completed_has_events: !completed || events_logged > 0.0,
        completed_has_outputs: !completed || has_outputs,
    }
}

/// Validation results for every worker of a document, keyed by worker name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateValidation {
    pub workers: BTreeMap<String, WorkerValidation>,
}

impl StateValidation {
    pub fn passed(&self) -> bool {
        self.workers.values().all(WorkerValidation::passed)
    }

    pub fn failing_workers(&self) -> impl Iterator<Item = (&String, &WorkerValidation)> {
        self.workers.iter().filter(|(_, result)| !result.passed())
    }
}

/// Runs `validate_worker_state` over `worker_states` of a whole document.
pub fn validate_state(document: &Value) -> StateValidation {
    let workers = document
        .get("worker_states")
        .and_then(Value::as_object)
        .map(|states| {
            states
                .iter()
                .map(|(name, state)| (name.clone(), validate_worker_state(state)))
                .collect()
        })
        .unwrap_or_default();
    StateValidation { workers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed_worker() -> Value {
        json!({
            "status": "completed",
            "task": "analyze auth flow",
            "spawned_at": "2025-08-31T14:30:00Z",
            "last_heartbeat": "2025-08-31T14:40:00Z",
            "metrics": {"events_logged": 5},
            "outputs": {"notes": "workers/notes/analyzer_notes.md"}
        })
    }

    #[test]
    fn test_completed_worker_passes() {
        let result = validate_worker_state(&completed_worker());
        assert!(result.passed());
        assert!(result.failed_checks().is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let result = validate_worker_state(&json!({"status": "active", "task": null}));
        assert!(!result.required_fields);
        assert_eq!(result.missing_fields, vec!["task", "spawned_at"]);
        assert!(result.valid_status);
        assert!(!result.passed());
    }

    #[test]
    fn test_invalid_status() {
        let mut worker = completed_worker();
        worker["status"] = json!("sleeping");
        let result = validate_worker_state(&worker);
        assert!(!result.valid_status);
        assert_eq!(result.failed_checks(), vec!["valid_status"]);
    }

    #[test]
    fn test_completed_requires_events_and_outputs() {
        let mut worker = completed_worker();
        worker["metrics"]["events_logged"] = json!(0);
        worker["outputs"] = json!({});
        let result = validate_worker_state(&worker);
        assert!(!result.completed_has_events);
        assert!(!result.completed_has_outputs);
        assert!(result.required_fields && result.valid_status);
    }

    #[test]
    fn test_active_worker_without_outputs_passes() {
        let worker = json!({
            "status": "active",
            "task": "t",
            "spawned_at": "2025-08-31T14:30:00Z",
            "metrics": {"events_logged": 0},
            "outputs": {}
        });
        assert!(validate_worker_state(&worker).passed());
    }

    #[test]
    fn test_validate_state() {
        let document = json!({
            "worker_states": {
                "analyzer-worker": completed_worker(),
                "broken-worker": {"status": "completed"}
            }
        });
        let result = validate_state(&document);
        assert!(!result.passed());
        let failing: Vec<_> = result.failing_workers().map(|(name, _)| name.as_str()).collect();
        assert_eq!(failing, vec!["broken-worker"]);
    }
}
