//! State store trait.
//!
//! Defines the interface for the single shared state document of a session.

use super::merge::{MergeStrategy, apply_patch};
use crate::error::Result;
use crate::session::SessionId;
use serde_json::Value;

/// A mutation applied to the current document while the store holds its lock.
pub type StateMutation<'a> = Box<dyn FnOnce(&mut Value) -> Result<()> + 'a>;

/// The shared, mutable state document of a session.
///
/// # Implementation Notes
///
/// Every write must go through the store's exclusive lock so that concurrent
/// updates from independent processes are serialized: an update never
/// observes a partially applied one, and a crashed writer leaves the last
/// fully committed document behind.
pub trait StateStore: Send + Sync {
    /// Reads the current document.
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: The parsed document
    /// - `Err(ConvoyError::SessionNotFound)`: No session directory
    /// - `Err(ConvoyError::StateMissing)`: Session exists without a document
    /// - `Err(ConvoyError::CorruptState)`: The document does not parse
    fn read(&self, session_id: &SessionId) -> Result<Value>;

    /// Locked read-modify-write.
    ///
    /// Applies `mutation`, refreshes `timestamps.updated_at` and
    /// `timestamps.last_heartbeat`, and writes the whole document back.
    /// If `mutation` fails nothing is written. Returns the committed document.
    fn update_with(&self, session_id: &SessionId, mutation: StateMutation<'_>) -> Result<Value>;

    /// Writes the first document of a session.
    ///
    /// Fails with `SessionAlreadyExists` if a document is already present.
    fn initialize(&self, session_id: &SessionId, document: &Value) -> Result<()>;

    /// Replaces the document wholesale, under the lock.
    ///
    /// Used to put a recovered document in place of a corrupt or missing one.
    fn restore(&self, session_id: &SessionId, document: &Value) -> Result<()>;

    /// Merges `patch` into the document with the given strategy.
    fn update(
        &self,
        session_id: &SessionId,
        patch: &Value,
        strategy: MergeStrategy,
    ) -> Result<Value> {
        self.update_with(
            session_id,
            Box::new(move |document: &mut Value| apply_patch(document, patch, strategy)),
        )
    }
}
