//! Event domain model.
//!
//! An event is one line of `EVENTS.jsonl`. The session it belongs to is
//! implied by the file it lives in, so `Event` has no session field at all.

use crate::text::truncate_chars;
use crate::timestamp::now_timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the `details` field, in characters.
pub const MAX_DETAILS_CHARS: usize = 500;

/// Event types the core itself produces or inspects.
///
/// Workers are free to log any other type; those are carried as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    SessionCreated,
    WorkerSpawned,
    SessionValidated,
    WorkerConfigured,
    AnalysisStarted,
    WorkerCompleted,
    WorkerFailed,
    StateRecovered,
}

/// Lifecycle every worker must log before it can pass compliance.
pub const REQUIRED_WORKER_EVENTS: [LifecycleEvent; 5] = [
    LifecycleEvent::WorkerSpawned,
    LifecycleEvent::SessionValidated,
    LifecycleEvent::WorkerConfigured,
    LifecycleEvent::AnalysisStarted,
    LifecycleEvent::WorkerCompleted,
];

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::SessionCreated => "session_created",
            LifecycleEvent::WorkerSpawned => "worker_spawned",
            LifecycleEvent::SessionValidated => "session_validated",
            LifecycleEvent::WorkerConfigured => "worker_configured",
            LifecycleEvent::AnalysisStarted => "analysis_started",
            LifecycleEvent::WorkerCompleted => "worker_completed",
            LifecycleEvent::WorkerFailed => "worker_failed",
            LifecycleEvent::StateRecovered => "state_recovered",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_created" => Ok(LifecycleEvent::SessionCreated),
            "worker_spawned" => Ok(LifecycleEvent::WorkerSpawned),
            "session_validated" => Ok(LifecycleEvent::SessionValidated),
            "worker_configured" => Ok(LifecycleEvent::WorkerConfigured),
            "analysis_started" => Ok(LifecycleEvent::AnalysisStarted),
            "worker_completed" => Ok(LifecycleEvent::WorkerCompleted),
            "worker_failed" => Ok(LifecycleEvent::WorkerFailed),
            "state_recovered" => Ok(LifecycleEvent::StateRecovered),
            other => Err(format!("unknown lifecycle event: {}", other)),
        }
    }
}

/// One immutable record of `EVENTS.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// UTC ISO-8601 timestamp
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Worker or coordinator that logged the event
    pub agent: String,
    /// Free-form payload, at most `MAX_DETAILS_CHARS` characters
    #[serde(default, deserialize_with = "details_as_string")]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Event {
    /// Creates an event stamped with the current UTC time.
    pub fn new(
        event_type: impl Into<String>,
        agent: impl Into<String>,
        details: &str,
        status: Option<String>,
    ) -> Self {
        Self::at(now_timestamp(), event_type, agent, details, status)
    }

    /// Creates an event with an explicit timestamp.
    pub fn at(
        timestamp: impl Into<String>,
        event_type: impl Into<String>,
        agent: impl Into<String>,
        details: &str,
        status: Option<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            event_type: event_type.into(),
            agent: agent.into(),
            details: truncate_chars(details, MAX_DETAILS_CHARS),
            status,
        }
    }

    pub fn is(&self, kind: LifecycleEvent) -> bool {
        self.event_type == kind.as_str()
    }
}

/// Other writers sometimes log structured details; keep them as JSON text.
fn details_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Result of reading an event log: the events in file order plus how many
/// lines had to be skipped because they did not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventReplay {
    pub events: Vec<Event>,
    pub skipped_lines: usize,
}

impl EventReplay {
    /// Parses JSONL text line by line. Blank lines are ignored; malformed
    /// lines are counted and skipped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut replay = Self::default();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Event>(line) {
                Ok(event) => replay.events.push(event),
                Err(_) => replay.skipped_lines += 1,
            }
        }
        replay
    }

    /// Events logged by one agent, in file order.
    pub fn for_agent<'a>(&'a self, agent: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |event| event.agent == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let event = Event::at(
            "2025-01-15T14:30:00Z",
            LifecycleEvent::WorkerSpawned.as_str(),
            "analyzer-worker",
            "started",
            None,
        );
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2025-01-15T14:30:00Z","type":"worker_spawned","agent":"analyzer-worker","details":"started"}"#
        );
    }

    #[test]
    fn test_status_is_serialized_when_present() {
        let event = Event::new("custom", "coordinator", "", Some("ok".to_string()));
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value.get("session_id").is_none());
    }

    #[test]
    fn test_details_truncated() {
        let long = "x".repeat(MAX_DETAILS_CHARS + 25);
        let event = Event::new("custom", "a", &long, None);
        assert_eq!(event.details.chars().count(), MAX_DETAILS_CHARS);
    }

    #[test]
    fn test_structured_details_are_kept_as_text() {
        let event: Event = serde_json::from_str(
            r#"{"timestamp":"t","type":"x","agent":"a","details":{"k":1}}"#,
        )
        .unwrap();
        assert_eq!(event.details, r#"{"k":1}"#);
    }

    #[test]
    fn test_replay_skips_malformed_lines() {
        let text = concat!(
            r#"{"timestamp":"t1","type":"worker_spawned","agent":"a","details":""}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"timestamp":"t2","agent":"a"}"#,
            "\n",
            r#"{"timestamp":"t3","type":"worker_completed","agent":"b","details":""}"#,
        );
        let replay = EventReplay::from_lines(text.lines());
        assert_eq!(replay.events.len(), 2);
        assert_eq!(replay.skipped_lines, 2);
        assert_eq!(replay.for_agent("b").count(), 1);
    }

    #[test]
    fn test_lifecycle_round_trip_names() {
        for kind in REQUIRED_WORKER_EVENTS {
            assert_eq!(kind.as_str().parse::<LifecycleEvent>().unwrap(), kind);
        }
        assert!("made_up".parse::<LifecycleEvent>().is_err());
    }
}
