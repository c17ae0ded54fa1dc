//! `STATE.json`-backed state store.

use crate::storage::{JsonDocumentFile, existing_session};
use convoy_core::config::LockStrategy;
use convoy_core::error::{ConvoyError, Result};
use convoy_core::session::{SessionId, SessionLayout};
use convoy_core::state::{StateMutation, StateStore, touch_timestamps};
use convoy_core::timestamp::now_timestamp;
use serde_json::Value;
use std::path::PathBuf;

/// State store keeping one `STATE.json` per session directory.
///
/// Writers serialize on `STATE.lock`; the document itself is replaced by
/// atomic rename, so unlocked readers always see a complete document.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    sessions_root: PathBuf,
    strategy: LockStrategy,
}

impl FileStateStore {
    pub fn new(sessions_root: impl Into<PathBuf>, strategy: LockStrategy) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            strategy,
        }
    }

    fn document(&self, layout: &SessionLayout) -> JsonDocumentFile {
        JsonDocumentFile::new(layout.state_file(), layout.state_lock_file(), self.strategy)
    }
}

impl StateStore for FileStateStore {
    fn read(&self, session_id: &SessionId) -> Result<Value> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let document = self.document(&layout);
        document
            .load()?
            .ok_or_else(|| ConvoyError::state_missing(session_id.as_str(), document.path()))
    }

    fn update_with(&self, session_id: &SessionId, mutation: StateMutation<'_>) -> Result<Value> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let document = self.document(&layout);

        tracing::debug!("[FileStateStore] update() called for session_id: {}", session_id);

        let committed = document.update(|current| {
            let mut state = current
                .ok_or_else(|| ConvoyError::state_missing(session_id.as_str(), document.path()))?;
            if !state.is_object() {
                return Err(ConvoyError::corrupt_state(
                    document.path(),
                    "state document is not a JSON object",
                ));
            }
            mutation(&mut state)?;
            touch_timestamps(&mut state, &now_timestamp());
            Ok(state)
        })?;

        tracing::debug!("[FileStateStore] State saved for session_id: {}", session_id);
        Ok(committed)
    }

    fn initialize(&self, session_id: &SessionId, initial: &Value) -> Result<()> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let document = self.document(&layout);

        document.update(|current| match current {
            Some(_) => Err(ConvoyError::SessionAlreadyExists {
                session_id: session_id.to_string(),
            }),
            None => Ok(initial.clone()),
        })?;
        Ok(())
    }

    fn restore(&self, session_id: &SessionId, replacement: &Value) -> Result<()> {
        let layout = existing_session(&self.sessions_root, session_id)?;
        let document = self.document(&layout);

        let _lock = document.lock()?;
        document.save(replacement)?;

        tracing::info!("[FileStateStore] Restored state document for {}", session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::state::{MergeStrategy, StateDocument};
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStateStore, SessionId) {
        let temp_dir = TempDir::new().unwrap();
        let session_id = SessionId::parse("2025-08-31-14-30-fix-auth-bug").unwrap();
        fs::create_dir_all(temp_dir.path().join(session_id.as_str())).unwrap();
        let store = FileStateStore::new(temp_dir.path(), LockStrategy::Advisory);
        let initial = StateDocument::new(session_id.as_str(), "2025-08-31T14:30:00Z");
        store
            .initialize(&session_id, &serde_json::to_value(initial).unwrap())
            .unwrap();
        (temp_dir, store, session_id)
    }

    fn state_path(temp_dir: &TempDir, session_id: &SessionId) -> PathBuf {
        temp_dir.path().join(session_id.as_str()).join("STATE.json")
    }

    #[test]
    fn test_deep_update_refreshes_timestamps() {
        let (_temp_dir, store, session_id) = setup();

        let committed = store
            .update(
                &session_id,
                &json!({"worker_states": {"analyzer-worker": {"status": "active"}}}),
                MergeStrategy::Deep,
            )
            .unwrap();

        assert_eq!(committed["worker_states"]["analyzer-worker"]["status"], "active");
        assert_ne!(committed["timestamps"]["updated_at"], "2025-08-31T14:30:00Z");
        assert_eq!(
            committed["timestamps"]["updated_at"],
            committed["timestamps"]["last_heartbeat"]
        );
        assert_eq!(store.read(&session_id).unwrap(), committed);
    }

    #[test]
    fn test_shallow_update_replaces_top_level() {
        let (_temp_dir, store, session_id) = setup();
        store
            .update(
                &session_id,
                &json!({"coordination_status": {"workers_spawned": ["a"]}}),
                MergeStrategy::Shallow,
            )
            .unwrap();

        let state = store.read(&session_id).unwrap();
        assert_eq!(state["coordination_status"], json!({"workers_spawned": ["a"]}));
        assert_eq!(state["version"], "1.0");
    }

    #[test]
    fn test_corrupt_state_is_a_hard_error() {
        let (temp_dir, store, session_id) = setup();
        fs::write(state_path(&temp_dir, &session_id), "{not json").unwrap();

        let err = store
            .update(&session_id, &json!({"x": 1}), MergeStrategy::Deep)
            .unwrap_err();
        assert!(matches!(err, ConvoyError::CorruptState { .. }));
        assert!(err.needs_recovery());

        // The corrupt file is left for recovery, not overwritten
        assert_eq!(
            fs::read_to_string(state_path(&temp_dir, &session_id)).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_missing_state_and_missing_session() {
        let (temp_dir, store, session_id) = setup();
        fs::remove_file(state_path(&temp_dir, &session_id)).unwrap();

        let err = store.read(&session_id).unwrap_err();
        assert!(matches!(err, ConvoyError::StateMissing { .. }));

        let ghost = SessionId::parse("2025-08-31-14-30-ghost").unwrap();
        let err = store
            .update(&ghost, &json!({}), MergeStrategy::Deep)
            .unwrap_err();
        assert!(matches!(err, ConvoyError::SessionNotFound { .. }));
    }

    #[test]
    fn test_initialize_refuses_existing_document() {
        let (_temp_dir, store, session_id) = setup();
        let err = store.initialize(&session_id, &json!({})).unwrap_err();
        assert!(matches!(err, ConvoyError::SessionAlreadyExists { .. }));
    }

    #[test]
    fn test_restore_replaces_corrupt_document() {
        let (temp_dir, store, session_id) = setup();
        fs::write(state_path(&temp_dir, &session_id), "").unwrap();

        store
            .restore(&session_id, &json!({"version": "1.0", "session_id": "x"}))
            .unwrap();

        assert_eq!(store.read(&session_id).unwrap()["session_id"], "x");
    }

    #[test]
    fn test_failed_mutation_leaves_document_untouched() {
        let (_temp_dir, store, session_id) = setup();
        let before = store.read(&session_id).unwrap();

        let result = store.update_with(
            &session_id,
            Box::new(|_: &mut Value| -> Result<()> {
                Err(ConvoyError::internal("rejected"))
            }),
        );

        assert!(result.is_err());
        assert_eq!(store.read(&session_id).unwrap(), before);
    }

    #[test]
    fn test_disabled_lock_updates_keep_state_parseable() {
        let temp_dir = TempDir::new().unwrap();
        let session_id = SessionId::parse("2025-08-31-14-30-fix-auth-bug").unwrap();
        fs::create_dir_all(temp_dir.path().join(session_id.as_str())).unwrap();
        let store = Arc::new(FileStateStore::new(temp_dir.path(), LockStrategy::Disabled));
        let initial = StateDocument::new(session_id.as_str(), "2025-08-31T14:30:00Z");
        store
            .initialize(&session_id, &serde_json::to_value(initial).unwrap())
            .unwrap();

        let blob = "x".repeat(20 * 1024);
        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let store = Arc::clone(&store);
                let session_id = session_id.clone();
                let blob = blob.clone();
                thread::spawn(move || {
                    for seq in 0..50 {
                        store
                            .update(
                                &session_id,
                                &json!({"writers": {format!("w{}", writer): {"seq": seq, "blob": blob}}}),
                                MergeStrategy::Deep,
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Without a lock updates may be lost, never torn
        let state = store.read(&session_id).unwrap();
        assert_eq!(state["version"], "1.0");
        assert!(state["writers"].is_object());
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let (_temp_dir, store, session_id) = setup();
        let store = Arc::new(store);
        let writers = 6;
        let updates_per_writer = 15;

        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let store = Arc::clone(&store);
                let session_id = session_id.clone();
                thread::spawn(move || {
                    for seq in 0..updates_per_writer {
                        // Read-modify-write of a shared counter: lost updates
                        // would show up as a short count.
                        store
                            .update_with(
                                &session_id,
                                Box::new(|state: &mut Value| -> Result<()> {
                                    let count = state["counter"].as_u64().unwrap_or(0);
                                    state["counter"] = json!(count + 1);
                                    Ok(())
                                }),
                            )
                            .unwrap();
                        // Disjoint deep patches must all survive
                        store
                            .update(
                                &session_id,
                                &json!({"writers": {format!("w{}", writer): {"last_seq": seq}}}),
                                MergeStrategy::Deep,
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = store.read(&session_id).unwrap();
        assert_eq!(state["counter"], writers * updates_per_writer);
        for writer in 0..writers {
            assert_eq!(
                state["writers"][format!("w{}", writer)]["last_seq"],
                updates_per_writer - 1
            );
        }
    }
}
