//! Debug log trait.

use super::model::{DebugEntry, DebugLevel};
use crate::error::Result;
use crate::session::SessionId;
use serde_json::Value;

/// An append-only, leveled diagnostic trace, one per session.
pub trait DebugLog: Send + Sync {
    /// Appends one entry to the session's debug log.
    fn append(&self, session_id: &SessionId, entry: &DebugEntry) -> Result<()>;

    /// Reads every entry of a session in append order, skipping malformed lines.
    fn read_all(&self, session_id: &SessionId) -> Result<Vec<DebugEntry>>;

    /// Builds an entry stamped now and appends it.
    fn log_debug(
        &self,
        session_id: &SessionId,
        level: DebugLevel,
        agent_name: &str,
        message: &str,
        context: Option<Value>,
    ) -> Result<()> {
        let entry = DebugEntry::new(level, agent_name, message, context);
        self.append(session_id, &entry)
    }

    /// Like `log_debug`, but never fails.
    ///
    /// Used when reporting on another operation: a failed telemetry write
    /// is only traced, never propagated.
    fn log_debug_best_effort(
        &self,
        session_id: &SessionId,
        level: DebugLevel,
        agent_name: &str,
        message: &str,
        context: Option<Value>,
    ) {
        if let Err(e) = self.log_debug(session_id, level, agent_name, message, context) {
            tracing::warn!(
                "[DebugLog] Failed to write {} entry for session {}: {}",
                level,
                session_id,
                e
            );
        }
    }
}
