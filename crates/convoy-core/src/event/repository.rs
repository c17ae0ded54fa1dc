//! Event log trait.
//!
//! Defines the interface for appending to and replaying a session's event log.

use super::model::{Event, EventReplay};
use crate::error::Result;
use crate::session::SessionId;

/// An append-only log of lifecycle events, one per session.
///
/// # Implementation Notes
///
/// Implementations must be safe for concurrent use by independent processes:
/// each `append` lands as one whole line and lines are never reordered once
/// written.
pub trait EventLog: Send + Sync {
    /// Appends one event to the session's log.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Event is durably stored
    /// - `Err(_)`: The write failed; nothing is masked at this layer
    fn append(&self, session_id: &SessionId, event: &Event) -> Result<()>;

    /// Reads every event of a session in append order.
    ///
    /// # Returns
    ///
    /// - `Ok(EventReplay)`: Parsed events plus the number of skipped lines
    /// - `Err(ConvoyError::SessionNotFound)`: The session directory is missing
    /// - `Err(ConvoyError::EventLogUnavailable)`: The log cannot be opened or read
    fn read_all(&self, session_id: &SessionId) -> Result<EventReplay>;

    /// Builds an event stamped now and appends it.
    fn log_event(
        &self,
        session_id: &SessionId,
        event_type: &str,
        agent_name: &str,
        details: &str,
        status: Option<&str>,
    ) -> Result<()> {
        let event = Event::new(
            event_type,
            agent_name,
            details,
            status.map(str::to_string),
        );
        self.append(session_id, &event)
    }
}
