//! Per-worker lifecycle reporting.
//!
//! Every report is a locked state update followed by one event append. The
//! state change is applied first so that a report for an unregistered worker
//! is rejected before anything reaches the event log.

use convoy_core::error::{ConvoyError, Result};
use convoy_core::event::{EventLog, LifecycleEvent};
use convoy_core::session::SessionId;
use convoy_core::state::{StateStore, WorkerState, WorkerStatus};
use convoy_core::timestamp::now_timestamp;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Reports the progress of one worker in one session.
pub struct WorkerReporter {
    session_id: SessionId,
    worker_name: String,
    state_store: Arc<dyn StateStore>,
    event_log: Arc<dyn EventLog>,
}

impl WorkerReporter {
    pub fn new(
        session_id: SessionId,
        worker_name: impl Into<String>,
        state_store: Arc<dyn StateStore>,
        event_log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            session_id,
            worker_name: worker_name.into(),
            state_store,
            event_log,
        }
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Registers the worker as `spawning` and logs `worker_spawned`.
    pub fn spawn(&self, task: &str) -> Result<()> {
        let worker = self.worker_name.clone();
        let mut entry = WorkerState::spawning(task, now_timestamp());
        entry.metrics.events_logged = 1;
        let entry = serde_json::to_value(entry)?;

        self.state_store.update_with(
            &self.session_id,
            Box::new(move |state: &mut Value| -> Result<()> {
                let root = root_object(state)?;
                child_object(root, "worker_states")?.insert(worker.clone(), entry);
                push_to_list(root, "coordination_status", "workers_spawned", worker)
            }),
        )?;

        self.emit(
            LifecycleEvent::WorkerSpawned.as_str(),
            task,
            Some(WorkerStatus::Spawning),
        )
    }

    /// Logs an intermediate event and counts it in `metrics.events_logged`.
    ///
    /// The first report after `spawn` moves the worker to `active`.
    pub fn record(&self, event_type: &str, details: &str) -> Result<()> {
        self.touch_worker(|entry| {
            if entry.get("status").and_then(Value::as_str) == Some(WorkerStatus::Spawning.as_str())
            {
                entry.insert("status".to_string(), json!(WorkerStatus::Active));
            }
            Ok(())
        })?;
        self.emit(event_type, details, None)
    }

    /// Refreshes the worker's heartbeat without logging an event.
    pub fn heartbeat(&self) -> Result<()> {
        let worker = self.worker_name.clone();
        self.state_store.update_with(
            &self.session_id,
            Box::new(move |state: &mut Value| -> Result<()> {
                let entry = worker_entry(state, &worker)?;
                entry.insert("last_heartbeat".to_string(), json!(now_timestamp()));
                Ok(())
            }),
        )?;

        tracing::trace!(
            "[WorkerReporter] Heartbeat from {} in {}",
            self.worker_name,
            self.session_id
        );
        Ok(())
    }

    /// Marks the worker `completed`, records its outputs and logs
    /// `worker_completed`.
    pub fn complete(&self, outputs: Map<String, Value>) -> Result<()> {
        let details = if outputs.is_empty() {
            "Completed without outputs".to_string()
        } else {
            let names: Vec<&str> = outputs.keys().map(String::as_str).collect();
            format!("Completed with outputs: {}", names.join(", "))
        };

        let worker = self.worker_name.clone();
        self.state_store.update_with(
            &self.session_id,
            Box::new(move |state: &mut Value| -> Result<()> {
                {
                    let entry = worker_entry(state, &worker)?;
                    record_report(entry)?;
                    entry.insert("status".to_string(), json!(WorkerStatus::Completed));
                    child_object(entry, "outputs")?.extend(outputs);
                }
                push_to_list(
                    root_object(state)?,
                    "coordination_status",
                    "workers_completed",
                    worker,
                )
            }),
        )?;

        self.emit(
            LifecycleEvent::WorkerCompleted.as_str(),
            &details,
            Some(WorkerStatus::Completed),
        )
    }

    /// Marks the worker `failed` and logs `worker_failed`.
    pub fn fail(&self, reason: &str) -> Result<()> {
        let failure = reason.to_string();
        self.touch_worker(move |entry| {
            entry.insert("status".to_string(), json!(WorkerStatus::Failed));
            entry.insert("error".to_string(), json!(failure));
            Ok(())
        })?;

        tracing::warn!(
            "[WorkerReporter] {} failed in {}: {}",
            self.worker_name,
            self.session_id,
            reason
        );
        self.emit(
            LifecycleEvent::WorkerFailed.as_str(),
            reason,
            Some(WorkerStatus::Failed),
        )
    }

    /// Counts one report on the worker entry, then applies `change`.
    fn touch_worker<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<()>,
    {
        let worker = self.worker_name.clone();
        self.state_store.update_with(
            &self.session_id,
            Box::new(move |state: &mut Value| -> Result<()> {
                let entry = worker_entry(state, &worker)?;
                record_report(entry)?;
                change(entry)
            }),
        )?;
        Ok(())
    }

    fn emit(&self, event_type: &str, details: &str, status: Option<WorkerStatus>) -> Result<()> {
        self.event_log.log_event(
            &self.session_id,
            event_type,
            &self.worker_name,
            details,
            status.as_ref().map(WorkerStatus::as_str),
        )?;

        tracing::debug!(
            "[WorkerReporter] {} logged {} in {}",
            self.worker_name,
            event_type,
            self.session_id
        );
        Ok(())
    }
}

/// Increments `metrics.events_logged` and refreshes the worker heartbeat.
fn record_report(entry: &mut Map<String, Value>) -> Result<()> {
    let metrics = child_object(entry, "metrics")?;
    let logged = metrics
        .get("events_logged")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    metrics.insert("events_logged".to_string(), json!(logged + 1));
    entry.insert("last_heartbeat".to_string(), json!(now_timestamp()));
    Ok(())
}

fn root_object(state: &mut Value) -> Result<&mut Map<String, Value>> {
    state
        .as_object_mut()
        .ok_or_else(|| ConvoyError::InvalidPatch("state document is not an object".to_string()))
}

/// The object at `key`, created empty if absent.
fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>> {
    match parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(child) => Ok(child),
        _ => Err(ConvoyError::InvalidPatch(format!(
            "`{}` is not an object",
            key
        ))),
    }
}

fn worker_entry<'a>(state: &'a mut Value, worker: &str) -> Result<&'a mut Map<String, Value>> {
    let workers = child_object(root_object(state)?, "worker_states")?;
    match workers.get_mut(worker) {
        Some(Value::Object(entry)) => Ok(entry),
        Some(_) => Err(ConvoyError::InvalidPatch(format!(
            "worker_states.{} is not an object",
            worker
        ))),
        None => Err(ConvoyError::InvalidPatch(format!(
            "worker {} has not been spawned",
            worker
        ))),
    }
}

fn push_to_list(
    root: &mut Map<String, Value>,
    section: &str,
    list: &str,
    item: String,
) -> Result<()> {
    match child_object(root, section)?
        .entry(list.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => {
            items.push(Value::String(item));
            Ok(())
        }
        _ => Err(ConvoyError::InvalidPatch(format!(
            "{}.{} is not a list",
            section, list
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionFactory;
    use convoy_core::config::LockStrategy;
    use convoy_core::state::validate_worker_state;
    use convoy_infrastructure::{FileStateStore, JsonlEventLog};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        store: Arc<FileStateStore>,
        events: Arc<JsonlEventLog>,
        reporter: WorkerReporter,
        session_id: SessionId,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStateStore::new(temp_dir.path(), LockStrategy::Advisory));
        let events = Arc::new(JsonlEventLog::new(temp_dir.path(), LockStrategy::Advisory));
        let session_id = SessionId::parse("2025-08-31-14-30-fix-auth-bug").unwrap();
        SessionFactory::new(temp_dir.path(), store.clone(), events.clone())
            .create(&session_id, None)
            .unwrap();
        let reporter = WorkerReporter::new(
            session_id.clone(),
            "analyzer-worker",
            store.clone(),
            events.clone(),
        );
        Fixture {
            _temp_dir: temp_dir,
            store,
            events,
            reporter,
            session_id,
        }
    }

    #[test]
    fn test_lifecycle_updates_state_and_log() {
        let fixture = setup();
        let reporter = &fixture.reporter;

        reporter.spawn("Analyze auth flow").unwrap();
        let state = fixture.store.read(&fixture.session_id).unwrap();
        assert_eq!(state["worker_states"]["analyzer-worker"]["status"], "spawning");
        assert_eq!(
            state["coordination_status"]["workers_spawned"],
            json!(["analyzer-worker"])
        );

        reporter.record("session_validated", "ok").unwrap();
        reporter.heartbeat().unwrap();
        let state = fixture.store.read(&fixture.session_id).unwrap();
        assert_eq!(state["worker_states"]["analyzer-worker"]["status"], "active");
        assert_eq!(
            state["worker_states"]["analyzer-worker"]["metrics"]["events_logged"],
            2
        );

        let mut outputs = Map::new();
        outputs.insert("notes".to_string(), json!("workers/notes/analyzer_notes.md"));
        reporter.complete(outputs).unwrap();

        let state = fixture.store.read(&fixture.session_id).unwrap();
        let worker = &state["worker_states"]["analyzer-worker"];
        assert_eq!(worker["status"], "completed");
        assert_eq!(worker["outputs"]["notes"], "workers/notes/analyzer_notes.md");
        assert!(validate_worker_state(worker).passed());
        assert_eq!(
            state["coordination_status"]["workers_completed"],
            json!(["analyzer-worker"])
        );

        let types: Vec<String> = fixture
            .events
            .read_all(&fixture.session_id)
            .unwrap()
            .for_agent("analyzer-worker")
            .map(|event| event.event_type.clone())
            .collect();
        assert_eq!(
            types,
            vec!["worker_spawned", "session_validated", "worker_completed"]
        );
    }

    #[test]
    fn test_fail_records_reason() {
        let fixture = setup();
        fixture.reporter.spawn("Analyze").unwrap();
        fixture.reporter.fail("model timeout").unwrap();

        let state = fixture.store.read(&fixture.session_id).unwrap();
        assert_eq!(state["worker_states"]["analyzer-worker"]["status"], "failed");
        assert_eq!(state["worker_states"]["analyzer-worker"]["error"], "model timeout");

        let replay = fixture.events.read_all(&fixture.session_id).unwrap();
        let last = replay.events.last().unwrap();
        assert!(last.is(LifecycleEvent::WorkerFailed));
        assert_eq!(last.status.as_deref(), Some("failed"));
    }

    #[test]
    fn test_unregistered_worker_is_rejected_before_logging() {
        let fixture = setup();
        let err = fixture.reporter.record("analysis_started", "").unwrap_err();
        assert!(matches!(err, ConvoyError::InvalidPatch(_)));

        let replay = fixture.events.read_all(&fixture.session_id).unwrap();
        assert_eq!(replay.for_agent("analyzer-worker").count(), 0);
    }
}
