//! On-disk layout of a session directory.

use super::id::SessionId;
use std::path::{Path, PathBuf};

pub const STATE_FILE: &str = "STATE.json";
pub const STATE_LOCK_FILE: &str = "STATE.lock";
pub const EVENTS_FILE: &str = "EVENTS.jsonl";
pub const DEBUG_FILE: &str = "DEBUG.jsonl";
pub const WORKERS_DIR: &str = "workers";

const WORKER_SUFFIX: &str = "-worker";

/// Resolves every path belonging to one session.
///
/// # Directory Structure
///
/// ```text
/// <sessions_root>/<session_id>/
/// ├── STATE.json
/// ├── STATE.lock
/// ├── EVENTS.jsonl
/// ├── DEBUG.jsonl
/// └── workers/
///     ├── notes/<prefix>_notes.md
///     └── json/<prefix>_response.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    dir: PathBuf,
}

impl SessionLayout {
    pub fn new(sessions_root: &Path, session_id: &SessionId) -> Self {
        Self {
            dir: sessions_root.join(session_id.as_str()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn state_lock_file(&self) -> PathBuf {
        self.dir.join(STATE_LOCK_FILE)
    }

    pub fn events_file(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    pub fn debug_file(&self) -> PathBuf {
        self.dir.join(DEBUG_FILE)
    }

    pub fn workers_dir(&self) -> PathBuf {
        self.dir.join(WORKERS_DIR)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.workers_dir().join("notes")
    }

    pub fn json_dir(&self) -> PathBuf {
        self.workers_dir().join("json")
    }

    /// `workers/notes/<prefix>_notes.md`
    pub fn notes_file(&self, worker_name: &str) -> PathBuf {
        self.notes_dir()
            .join(format!("{}_notes.md", worker_prefix(worker_name)))
    }

    /// `workers/<prefix>_notes.md`, written by workers that skip the `notes/` level.
    pub fn flat_notes_file(&self, worker_name: &str) -> PathBuf {
        self.workers_dir()
            .join(format!("{}_notes.md", worker_prefix(worker_name)))
    }

    /// `workers/json/<prefix>_response.json`
    pub fn response_file(&self, worker_name: &str) -> PathBuf {
        self.json_dir()
            .join(format!("{}_response.json", worker_prefix(worker_name)))
    }

    /// True if either notes location holds a file for this worker.
    pub fn notes_exist(&self, worker_name: &str) -> bool {
        self.notes_file(worker_name).is_file() || self.flat_notes_file(worker_name).is_file()
    }
}

/// File-name prefix for a worker's artifacts: the name minus a trailing `-worker`.
pub fn worker_prefix(worker_name: &str) -> &str {
    match worker_name.strip_suffix(WORKER_SUFFIX) {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => worker_name,
    }
}
