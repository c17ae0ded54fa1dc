//! Worker lifecycle compliance checks.

use convoy_core::debug::{DebugLevel, DebugLog};
use convoy_core::event::{EventLog, EventReplay, LifecycleEvent, REQUIRED_WORKER_EVENTS};
use convoy_core::session::{SessionId, SessionLayout};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of checking one worker against the required lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    pub worker: String,
    /// Event types logged by the worker, in file order.
    pub events_seen: Vec<String>,
    pub first_event: Option<String>,
    /// Required event types the worker never logged.
    pub missing_events: Vec<String>,
    pub notes_exists: bool,
    pub json_exists: bool,
}

impl ComplianceReport {
    pub fn first_event_ok(&self) -> bool {
        self.first_event.as_deref() == Some(LifecycleEvent::WorkerSpawned.as_str())
    }

    pub fn passed(&self) -> bool {
        self.missing_events.is_empty()
            && self.first_event_ok()
            && self.notes_exists
            && self.json_exists
    }

    /// Human-readable list of failed checks.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if !self.missing_events.is_empty() {
            failures.push(format!(
                "missing events: {}",
                self.missing_events.join(", ")
            ));
        }
        if !self.first_event_ok() {
            failures.push(format!(
                "first event is {} (expected {})",
                self.first_event.as_deref().unwrap_or("none"),
                LifecycleEvent::WorkerSpawned
            ));
        }
        if !self.notes_exists {
            failures.push("notes file missing".to_string());
        }
        if !self.json_exists {
            failures.push("JSON response file missing".to_string());
        }
        failures
    }

    fn context(&self) -> Value {
        json!({
            "missing_events": self.missing_events,
            "first_event": self.first_event,
            "notes_exists": self.notes_exists,
            "json_exists": self.json_exists,
        })
    }
}

/// Verifies that a worker logged the full lifecycle and wrote its artifacts.
pub struct ComplianceVerifier {
    sessions_root: PathBuf,
    event_log: Arc<dyn EventLog>,
    debug_log: Arc<dyn DebugLog>,
}

impl ComplianceVerifier {
    pub fn new(
        sessions_root: impl Into<PathBuf>,
        event_log: Arc<dyn EventLog>,
        debug_log: Arc<dyn DebugLog>,
    ) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            event_log,
            debug_log,
        }
    }

    /// Builds the compliance report for `worker_name`.
    ///
    /// An event log that cannot be read counts as zero events, so the report
    /// fails on missing events instead of erroring.
    pub fn check_worker_compliance(
        &self,
        session_id: &SessionId,
        worker_name: &str,
    ) -> ComplianceReport {
        let replay = self.event_log.read_all(session_id).unwrap_or_else(|e| {
            tracing::warn!(
                "[ComplianceVerifier] Treating event log of {} as empty: {}",
                session_id,
                e
            );
            EventReplay::default()
        });

        let events_seen: Vec<String> = replay
            .for_agent(worker_name)
            .map(|event| event.event_type.clone())
            .collect();

        let missing_events = REQUIRED_WORKER_EVENTS
            .iter()
            .filter(|required| !events_seen.iter().any(|seen| seen == required.as_str()))
            .map(|required| required.as_str().to_string())
            .collect();

        let layout = SessionLayout::new(&self.sessions_root, session_id);

        ComplianceReport {
            worker: worker_name.to_string(),
            first_event: events_seen.first().cloned(),
            events_seen,
            missing_events,
            notes_exists: layout.notes_exist(worker_name),
            json_exists: layout.response_file(worker_name).is_file(),
        }
    }

    /// Checks `worker_name` and records the verdict in the session's debug log.
    ///
    /// A failure writes a `COMPLIANCE` entry naming the failed checks; a pass
    /// writes a `SUCCESS` entry. Either write is best-effort.
    pub fn verify_worker_compliance(&self, session_id: &SessionId, worker_name: &str) -> bool {
        let report = self.check_worker_compliance(session_id, worker_name);
        let passed = report.passed();

        if passed {
            tracing::info!(
                "[ComplianceVerifier] {} passed compliance in {}",
                worker_name,
                session_id
            );
            self.debug_log.log_debug_best_effort(
                session_id,
                DebugLevel::Success,
                worker_name,
                &format!("Worker {} passed compliance verification", worker_name),
                Some(report.context()),
            );
        } else {
            let failures = report.failures();
            tracing::warn!(
                "[ComplianceVerifier] {} failed compliance in {}: {}",
                worker_name,
                session_id,
                failures.join("; ")
            );
            self.debug_log.log_debug_best_effort(
                session_id,
                DebugLevel::Compliance,
                worker_name,
                &format!(
                    "Worker {} failed compliance verification: {}",
                    worker_name,
                    failures.join("; ")
                ),
                Some(report.context()),
            );
        }

        passed
    }
}
