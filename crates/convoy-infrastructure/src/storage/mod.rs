//! Storage layer for locked, atomic file operations.

mod append_log;
mod file_lock;
mod json_document;

pub use append_log::{AppendLog, AppendOutcome};
pub use file_lock::{FileLock, LockStatus};
pub use json_document::JsonDocumentFile;

use convoy_core::error::{ConvoyError, Result};
use convoy_core::session::{SessionId, SessionLayout};
use std::path::Path;

/// Resolves the layout of a session that must already exist on disk.
pub(crate) fn existing_session(sessions_root: &Path, session_id: &SessionId) -> Result<SessionLayout> {
    let layout = SessionLayout::new(sessions_root, session_id);
    if layout.exists() {
        Ok(layout)
    } else {
        Err(ConvoyError::session_not_found(session_id.as_str()))
    }
}
