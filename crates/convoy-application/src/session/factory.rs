use super::COORDINATOR_AGENT;
use convoy_core::error::Result;
use convoy_core::event::{EventLog, LifecycleEvent};
use convoy_core::session::{SessionId, SessionLayout};
use convoy_core::state::{StateDocument, StateStore};
use convoy_core::timestamp::now_timestamp;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for new session directories.
///
/// Lays out the directory tree, writes the first state document and logs
/// `session_created`.
pub struct SessionFactory {
    sessions_root: PathBuf,
    state_store: Arc<dyn StateStore>,
    event_log: Arc<dyn EventLog>,
}

impl SessionFactory {
    /// Creates a new SessionFactory.
    ///
    /// # Arguments
    ///
    /// * `sessions_root` - Directory holding one subdirectory per session
    /// * `state_store` - Store the initial document is written through
    /// * `event_log` - Log receiving the `session_created` event
    pub fn new(
        sessions_root: impl Into<PathBuf>,
        state_store: Arc<dyn StateStore>,
        event_log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            sessions_root: sessions_root.into(),
            state_store,
            event_log,
        }
    }

    /// Creates the session directory tree and its initial state.
    ///
    /// # Errors
    ///
    /// Returns `SessionAlreadyExists` if the session already has a state
    /// document; the existing document is left untouched.
    pub fn create(
        &self,
        session_id: &SessionId,
        description: Option<&str>,
    ) -> Result<StateDocument> {
        let layout = SessionLayout::new(&self.sessions_root, session_id);
        fs::create_dir_all(layout.notes_dir())?;
        fs::create_dir_all(layout.json_dir())?;

        let mut document = StateDocument::new(session_id.as_str(), now_timestamp());
        document.description = description.map(str::to_string);
        self.state_store
            .initialize(session_id, &serde_json::to_value(&document)?)?;

        self.event_log.log_event(
            session_id,
            LifecycleEvent::SessionCreated.as_str(),
            COORDINATOR_AGENT,
            description.unwrap_or("Session created"),
            None,
        )?;

        tracing::info!(
            "[SessionFactory] Created session {} at {}",
            session_id,
            layout.dir().display()
        );
        Ok(document)
    }
}
