//! `DEBUG.jsonl`-backed debug log.

use crate::storage::{AppendLog, existing_session};
use convoy_core::config::LockStrategy;
use convoy_core::debug::{DebugEntry, DebugLog};
use convoy_core::error::Result;
use convoy_core::session::SessionId;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonlDebugLog {
    sessions_root: PathBuf,
    append_log: AppendLog,
}

impl JsonlDebugLog {
    pub fn new(sessions_root: impl Into<PathBuf>, strategy: LockStrategy) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            append_log: AppendLog::new(strategy),
        }
    }
}

impl DebugLog for JsonlDebugLog {
    fn append(&self, session_id: &SessionId, entry: &DebugEntry) -> Result<()> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        self.append_log.append_record(&layout.debug_file(), entry)?;
        Ok(())
    }

    fn read_all(&self, session_id: &SessionId) -> Result<Vec<DebugEntry>> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let bytes = match fs::read(layout.debug_file()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::debug::{DebugLevel, MAX_MESSAGE_CHARS};
    use convoy_core::error::ConvoyError;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonlDebugLog, SessionId) {
        let temp_dir = TempDir::new().unwrap();
        let session_id = SessionId::parse("2025-08-31-14-30-fix-auth-bug").unwrap();
        fs::create_dir_all(temp_dir.path().join(session_id.as_str())).unwrap();
        let log = JsonlDebugLog::new(temp_dir.path(), LockStrategy::Advisory);
        (temp_dir, log, session_id)
    }

    #[test]
    fn test_log_debug_round_trip() {
        let (_temp_dir, log, session_id) = setup();

        log.log_debug(
            &session_id,
            DebugLevel::Warning,
            "coordinator",
            "heartbeat late",
            Some(json!({"worker": "analyzer-worker"})),
        )
        .unwrap();
        log.log_debug(&session_id, DebugLevel::Info, "coordinator", "ok", None)
            .unwrap();

        let entries = log.read_all(&session_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, DebugLevel::Warning);
        assert_eq!(entries[0].context.as_ref().unwrap()["worker"], "analyzer-worker");
        assert_eq!(entries[1].message, "ok");
    }

    #[test]
    fn test_message_truncated_to_limit() {
        let (_temp_dir, log, session_id) = setup();

        log.log_debug(
            &session_id,
            DebugLevel::Info,
            "a",
            &"m".repeat(MAX_MESSAGE_CHARS + 1),
            None,
        )
        .unwrap();

        let entries = log.read_all(&session_id).unwrap();
        assert_eq!(entries[0].message.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_read_without_file_is_empty() {
        let (_temp_dir, log, session_id) = setup();
        assert!(log.read_all(&session_id).unwrap().is_empty());
    }

    #[test]
    fn test_best_effort_swallows_missing_session() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlDebugLog::new(temp_dir.path(), LockStrategy::Advisory);
        let session_id = SessionId::parse("2025-08-31-14-30-ghost").unwrap();

        let err = log
            .log_debug(&session_id, DebugLevel::Error, "a", "m", None)
            .unwrap_err();
        assert!(matches!(err, ConvoyError::SessionNotFound { .. }));

        // Must not panic or propagate
        log.log_debug_best_effort(&session_id, DebugLevel::Error, "a", "m", None);
    }
}
