//! Heartbeat monitoring of active workers.

use chrono::{DateTime, Duration, Utc};
use convoy_core::error::Result;
use convoy_core::session::SessionId;
use convoy_core::state::{StateStore, WorkerStatus};
use convoy_core::timestamp::parse_timestamp;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// An active worker whose heartbeat is older than the timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleWorker {
    pub worker: String,
    pub last_heartbeat: String,
    pub elapsed_seconds: i64,
}

/// Read-only staleness query over a session's state document.
///
/// Reports stale workers only; marking them failed is up to the caller.
pub struct HealthMonitor {
    state_store: Arc<dyn StateStore>,
    heartbeat_timeout_secs: u64,
}

impl HealthMonitor {
    pub fn new(state_store: Arc<dyn StateStore>, heartbeat_timeout_secs: u64) -> Self {
        Self {
            state_store,
            heartbeat_timeout_secs,
        }
    }

    pub fn check_worker_health(&self, session_id: &SessionId) -> Result<Vec<StaleWorker>> {
        self.check_worker_health_at(session_id, Utc::now())
    }

    /// Like `check_worker_health`, measured against `now`.
    pub fn check_worker_health_at(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Vec<StaleWorker>> {
        let document = self.state_store.read(session_id)?;
        let stale = find_stale_workers(&document, now, self.heartbeat_timeout_secs);

        tracing::debug!(
            "[HealthMonitor] {} stale worker(s) in {}",
            stale.len(),
            session_id
        );
        Ok(stale)
    }
}

/// Active workers in `document` whose heartbeat is more than
/// `timeout_secs` older than `now`.
pub fn find_stale_workers(document: &Value, now: DateTime<Utc>, timeout_secs: u64) -> Vec<StaleWorker> {
    let Some(workers) = document.get("worker_states").and_then(Value::as_object) else {
        return Vec::new();
    };
    let timeout = i64::try_from(timeout_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX);

    workers
        .iter()
        .filter(|(_, state)| {
            state.get("status").and_then(Value::as_str) == Some(WorkerStatus::Active.as_str())
        })
        .filter_map(|(name, state)| {
            let raw = state.get("last_heartbeat").and_then(Value::as_str);
            let Some(heartbeat) = raw.and_then(parse_timestamp) else {
                tracing::warn!(
                    "[HealthMonitor] Active worker {} has no usable heartbeat ({:?}); skipping",
                    name,
                    raw
                );
                return None;
            };

            let elapsed = now - heartbeat;
            (elapsed > timeout).then(|| StaleWorker {
                worker: name.clone(),
                last_heartbeat: raw.unwrap_or_default().to_string(),
                elapsed_seconds: elapsed.num_seconds(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 31, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_only_active_workers_are_flagged() {
        let document = json!({
            "worker_states": {
                "stale-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:50:00Z"},
                "fresh-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:58:00Z"},
                "done-worker": {"status": "completed", "last_heartbeat": "2025-08-31T10:00:00Z"},
                "spawning-worker": {"status": "spawning", "last_heartbeat": "2025-08-31T10:00:00Z"}
            }
        });

        let stale = find_stale_workers(&document, now(), 300);
        assert_eq!(
            stale,
            vec![StaleWorker {
                worker: "stale-worker".to_string(),
                last_heartbeat: "2025-08-31T14:50:00Z".to_string(),
                elapsed_seconds: 600,
            }]
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let document = json!({
            "worker_states": {
                "edge-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:55:00Z"},
                "past-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:54:59Z"}
            }
        });

        let stale = find_stale_workers(&document, now(), 300);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].worker, "past-worker");
        assert_eq!(stale[0].elapsed_seconds, 301);
    }

    #[test]
    fn test_subsecond_overrun_is_stale() {
        let document = json!({
            "worker_states": {
                "late-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:55:00Z"}
            }
        });
        let now = Utc.with_ymd_and_hms(2025, 8, 31, 15, 0, 0).unwrap()
            + Duration::milliseconds(900);

        let stale = find_stale_workers(&document, now, 300);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].worker, "late-worker");
        assert_eq!(stale[0].elapsed_seconds, 300);
    }

    #[test]
    fn test_unusable_heartbeats_are_skipped() {
        let document = json!({
            "worker_states": {
                "a-worker": {"status": "active"},
                "b-worker": {"status": "active", "last_heartbeat": "yesterday"},
                "c-worker": {"status": "active", "last_heartbeat": "2025-08-31T10:00:00"}
            }
        });

        let stale = find_stale_workers(&document, now(), 300);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].worker, "c-worker");
    }

    #[test]
    fn test_custom_timeout_and_empty_document() {
        let document = json!({
            "worker_states": {
                "a-worker": {"status": "active", "last_heartbeat": "2025-08-31T14:58:00Z"}
            }
        });
        assert_eq!(find_stale_workers(&document, now(), 60).len(), 1);
        assert!(find_stale_workers(&json!({}), now(), 60).is_empty());
    }
}
