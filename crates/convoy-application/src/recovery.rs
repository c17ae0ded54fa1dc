//! Rebuilding a session's state document from its event log.

use convoy_core::error::Result;
use convoy_core::event::EventLog;
use convoy_core::session::SessionId;
use convoy_core::state::{StateDocument, fold_events};
use std::sync::Arc;

/// Replays `EVENTS.jsonl` into a fresh state document.
///
/// Never reads `STATE.json`: the document it produces is meant to replace a
/// corrupt or missing one.
pub struct StateRecovery {
    event_log: Arc<dyn EventLog>,
}

impl StateRecovery {
    pub fn new(event_log: Arc<dyn EventLog>) -> Self {
        Self { event_log }
    }

    /// Folds the session's event log into a new document.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session directory is missing
    /// - `EventLogUnavailable` if there is no log to rebuild from
    pub fn recover_state(&self, session_id: &SessionId) -> Result<StateDocument> {
        let replay = self.event_log.read_all(session_id)?;
        let document = fold_events(session_id, &replay);

        tracing::info!(
            "[StateRecovery] Rebuilt state for {} from {} event(s): {} spawned, {} completed",
            session_id,
            replay.events.len(),
            document.coordination_status.workers_spawned.len(),
            document.coordination_status.workers_completed.len()
        );
        Ok(document)
    }
}
