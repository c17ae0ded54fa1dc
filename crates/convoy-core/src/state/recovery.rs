//! Rebuilding a state document from the event log alone.

use super::model::{RecoveryInfo, StateDocument, StateTimestamps};
use crate::event::{EventReplay, LifecycleEvent};
use crate::session::{EVENTS_FILE, SessionId};

/// Folds a replayed event log into a fresh state document.
///
/// - `session_created` sets `created_at` (the last one wins)
/// - every `worker_spawned` appends its agent to `workers_spawned`
/// - every `worker_completed` appends its agent to `workers_completed`
///
/// Replays accumulate: duplicates are kept. The result depends only on the
/// replay, never on wall-clock time, so folding the same log twice yields the
/// same document.
pub fn fold_events(session_id: &SessionId, replay: &EventReplay) -> StateDocument {
    let mut document = StateDocument::new(session_id.as_str(), String::new());
    document.created_at = None;
    document.timestamps = StateTimestamps::default();

    for event in &replay.events {
        match event.event_type.parse::<LifecycleEvent>() {
            Ok(LifecycleEvent::SessionCreated) => {
                document.created_at = Some(event.timestamp.clone());
            }
            Ok(LifecycleEvent::WorkerSpawned) => {
                document
                    .coordination_status
                    .workers_spawned
                    .push(event.agent.clone());
            }
            Ok(LifecycleEvent::WorkerCompleted) => {
                document
                    .coordination_status
                    .workers_completed
                    .push(event.agent.clone());
            }
            _ => {}
        }
    }

    if let Some(last) = replay.events.last() {
        document.timestamps.updated_at = Some(last.timestamp.clone());
        document.timestamps.last_heartbeat = Some(last.timestamp.clone());
    }
    document.recovery = Some(RecoveryInfo {
        source: EVENTS_FILE.to_string(),
        events_replayed: replay.events.len(),
        lines_skipped: replay.skipped_lines,
    });
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn session_id() -> SessionId {
        SessionId::parse("2025-08-31-14-30-fix-auth-bug").unwrap()
    }

    fn replay() -> EventReplay {
        EventReplay {
            events: vec![
                Event::at("2025-08-31T14:30:00Z", "session_created", "coordinator", "", None),
                Event::at("2025-08-31T14:31:00Z", "worker_spawned", "analyzer-worker", "", None),
                Event::at("2025-08-31T14:32:00Z", "analysis_started", "analyzer-worker", "", None),
                Event::at("2025-08-31T14:33:00Z", "worker_spawned", "reviewer-worker", "", None),
                Event::at("2025-08-31T14:34:00Z", "worker_completed", "analyzer-worker", "", None),
                Event::at("2025-08-31T14:35:00Z", "worker_spawned", "analyzer-worker", "", None),
            ],
            skipped_lines: 1,
        }
    }

    #[test]
    fn test_fold() {
        let document = fold_events(&session_id(), &replay());

        assert_eq!(document.session_id, "2025-08-31-14-30-fix-auth-bug");
        assert_eq!(document.created_at.as_deref(), Some("2025-08-31T14:30:00Z"));
        assert_eq!(
            document.coordination_status.workers_spawned,
            vec!["analyzer-worker", "reviewer-worker", "analyzer-worker"]
        );
        assert_eq!(
            document.coordination_status.workers_completed,
            vec!["analyzer-worker"]
        );
        assert_eq!(
            document.timestamps.updated_at.as_deref(),
            Some("2025-08-31T14:35:00Z")
        );
        let recovery = document.recovery.unwrap();
        assert_eq!(recovery.events_replayed, 6);
        assert_eq!(recovery.lines_skipped, 1);
    }

    #[test]
    fn test_fold_is_deterministic() {
        let first = serde_json::to_string(&fold_events(&session_id(), &replay())).unwrap();
        let second = serde_json::to_string(&fold_events(&session_id(), &replay())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fold_empty_log() {
        let document = fold_events(&session_id(), &EventReplay::default());
        assert!(document.created_at.is_none());
        assert!(document.coordination_status.workers_spawned.is_empty());
        assert!(document.timestamps.updated_at.is_none());
    }
}
