//! `EVENTS.jsonl`-backed event log.

use crate::storage::{AppendLog, LockStatus, existing_session};
use convoy_core::config::LockStrategy;
use convoy_core::error::{ConvoyError, Result};
use convoy_core::event::{Event, EventLog, EventReplay};
use convoy_core::session::SessionId;
use std::fs;
use std::path::PathBuf;

/// Event log stored as one JSON object per line in each session directory.
#[derive(Debug, Clone)]
pub struct JsonlEventLog {
    sessions_root: PathBuf,
    append_log: AppendLog,
}

impl JsonlEventLog {
    pub fn new(sessions_root: impl Into<PathBuf>, strategy: LockStrategy) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            append_log: AppendLog::new(strategy),
        }
    }
}

impl EventLog for JsonlEventLog {
    fn append(&self, session_id: &SessionId, event: &Event) -> Result<()> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let outcome = self.append_log.append_record(&layout.events_file(), event)?;
        if outcome.lock == LockStatus::Degraded {
            tracing::debug!(
                "[JsonlEventLog] Appended '{}' for {} without a lock",
                event.event_type,
                session_id
            );
        }
        Ok(())
    }

    fn read_all(&self, session_id: &SessionId) -> Result<EventReplay> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let path = layout.events_file();
        let bytes = fs::read(&path)
            .map_err(|e| ConvoyError::event_log_unavailable(&path, e.to_string()))?;

        let text = String::from_utf8_lossy(&bytes);
        let replay = EventReplay::from_lines(text.lines());
        if replay.skipped_lines > 0 {
            tracing::warn!(
                "[JsonlEventLog] Skipped {} malformed line(s) in {}",
                replay.skipped_lines,
                path.display()
            );
        }
        Ok(replay)
    }
}
