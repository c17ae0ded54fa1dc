//! Coordinator facade over one sessions root.
//!
//! `SessionCoordinator` wires the file-backed stores to the recovery,
//! compliance and health services so callers deal with a single object.

use crate::compliance::{ComplianceReport, ComplianceVerifier};
use crate::health::{HealthMonitor, StaleWorker};
use crate::recovery::StateRecovery;
use crate::session::{COORDINATOR_AGENT, SessionFactory, WorkerReporter};
use convoy_core::config::CoordinationConfig;
use convoy_core::debug::{DebugEntry, DebugLevel, DebugLog};
use convoy_core::error::Result;
use convoy_core::event::{EventLog, EventReplay, LifecycleEvent};
use convoy_core::session::{SessionId, SessionLayout};
use convoy_core::state::{MergeStrategy, StateDocument, StateStore, StateValidation, validate_state};
use convoy_infrastructure::{FileStateStore, JsonlDebugLog, JsonlEventLog};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct SessionCoordinator {
    config: CoordinationConfig,
    state_store: Arc<dyn StateStore>,
    event_log: Arc<dyn EventLog>,
    debug_log: Arc<dyn DebugLog>,
    recovery: StateRecovery,
    compliance: ComplianceVerifier,
    health: HealthMonitor,
}

impl SessionCoordinator {
    pub fn new(
        config: CoordinationConfig,
        state_store: Arc<dyn StateStore>,
        event_log: Arc<dyn EventLog>,
        debug_log: Arc<dyn DebugLog>,
    ) -> Self {
        let recovery = StateRecovery::new(event_log.clone());
        let compliance = ComplianceVerifier::new(
            config.sessions_root.clone(),
            event_log.clone(),
            debug_log.clone(),
        );
        let health = HealthMonitor::new(state_store.clone(), config.heartbeat_timeout_secs);

        Self {
            config,
            state_store,
            event_log,
            debug_log,
            recovery,
            compliance,
            health,
        }
    }

    /// Builds a coordinator over the file-backed stores described by `config`.
    pub fn from_config(config: CoordinationConfig) -> Self {
        let root = config.sessions_root.clone();
        let strategy = config.lock_strategy;

        tracing::debug!(
            "[SessionCoordinator] Using sessions root {} (lock strategy {:?})",
            root.display(),
            strategy
        );

        Self::new(
            config,
            Arc::new(FileStateStore::new(root.clone(), strategy)),
            Arc::new(JsonlEventLog::new(root.clone(), strategy)),
            Arc::new(JsonlDebugLog::new(root, strategy)),
        )
    }

    pub fn config(&self) -> &CoordinationConfig {
        &self.config
    }

    pub fn layout(&self, session_id: &SessionId) -> SessionLayout {
        SessionLayout::new(&self.config.sessions_root, session_id)
    }

    pub fn session_factory(&self) -> SessionFactory {
        SessionFactory::new(
            self.config.sessions_root.clone(),
            self.state_store.clone(),
            self.event_log.clone(),
        )
    }

    pub fn worker_reporter(&self, session_id: &SessionId, worker_name: &str) -> WorkerReporter {
        WorkerReporter::new(
            session_id.clone(),
            worker_name,
            self.state_store.clone(),
            self.event_log.clone(),
        )
    }

    pub fn create_session(
        &self,
        session_id: &SessionId,
        description: Option<&str>,
    ) -> Result<StateDocument> {
        self.session_factory().create(session_id, description)
    }

    pub fn log_event(
        &self,
        session_id: &SessionId,
        event_type: &str,
        agent_name: &str,
        details: &str,
        status: Option<&str>,
    ) -> Result<()> {
        self.event_log
            .log_event(session_id, event_type, agent_name, details, status)
    }

    pub fn log_debug(
        &self,
        session_id: &SessionId,
        level: DebugLevel,
        agent_name: &str,
        message: &str,
        context: Option<Value>,
    ) -> Result<()> {
        self.debug_log
            .log_debug(session_id, level, agent_name, message, context)
    }

    pub fn events(&self, session_id: &SessionId) -> Result<EventReplay> {
        self.event_log.read_all(session_id)
    }

    pub fn debug_entries(&self, session_id: &SessionId) -> Result<Vec<DebugEntry>> {
        self.debug_log.read_all(session_id)
    }

    pub fn read_state(&self, session_id: &SessionId) -> Result<Value> {
        self.state_store.read(session_id)
    }

    pub fn update_state(
        &self,
        session_id: &SessionId,
        patch: &Value,
        strategy: MergeStrategy,
    ) -> Result<Value> {
        self.state_store.update(session_id, patch, strategy)
    }

    /// Rebuilds the document from the event log without writing it.
    pub fn recover_state(&self, session_id: &SessionId) -> Result<StateDocument> {
        self.recovery.recover_state(session_id)
    }

    /// Rebuilds the document from the event log and puts it in place.
    ///
    /// Leaves a `WARNING` debug entry and a `state_recovered` event behind;
    /// neither write can fail the restore once the document is committed.
    pub fn restore_from_events(&self, session_id: &SessionId, reason: &str) -> Result<Value> {
        let document = self.recovery.recover_state(session_id)?;
        let value = serde_json::to_value(&document)?;
        self.state_store.restore(session_id, &value)?;

        let (replayed, skipped) = document
            .recovery
            .as_ref()
            .map(|info| (info.events_replayed, info.lines_skipped))
            .unwrap_or_default();

        self.debug_log.log_debug_best_effort(
            session_id,
            DebugLevel::Warning,
            COORDINATOR_AGENT,
            &format!("State document rebuilt from event log: {}", reason),
            Some(json!({
                "events_replayed": replayed,
                "lines_skipped": skipped,
            })),
        );
        if let Err(e) = self.event_log.log_event(
            session_id,
            LifecycleEvent::StateRecovered.as_str(),
            COORDINATOR_AGENT,
            &format!("Replayed {} event(s)", replayed),
            None,
        ) {
            tracing::warn!(
                "[SessionCoordinator] Failed to log state_recovered for {}: {}",
                session_id,
                e
            );
        }

        Ok(value)
    }

    /// Reads the document, rebuilding it from the event log if it is corrupt
    /// or missing.
    pub fn load_or_recover(&self, session_id: &SessionId) -> Result<Value> {
        match self.state_store.read(session_id) {
            Ok(state) => Ok(state),
            Err(e) if e.needs_recovery() => {
                tracing::warn!(
                    "[SessionCoordinator] Recovering state of {}: {}",
                    session_id,
                    e
                );
                self.restore_from_events(session_id, &e.to_string())
            }
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self, session_id: &SessionId) -> Result<StateValidation> {
        let state = self.state_store.read(session_id)?;
        Ok(validate_state(&state))
    }

    pub fn check_worker_compliance(
        &self,
        session_id: &SessionId,
        worker_name: &str,
    ) -> ComplianceReport {
        self.compliance
            .check_worker_compliance(session_id, worker_name)
    }

    pub fn verify_worker_compliance(&self, session_id: &SessionId, worker_name: &str) -> bool {
        self.compliance
            .verify_worker_compliance(session_id, worker_name)
    }

    pub fn check_worker_health(&self, session_id: &SessionId) -> Result<Vec<StaleWorker>> {
        self.health.check_worker_health(session_id)
    }
}
