//! UTC timestamp helpers shared by every record the core writes.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Formats a UTC instant as `2025-01-15T14:30:00Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The current UTC time, formatted for storage.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 with any offset as well as naive ISO-8601 values written
/// by other tools, which are taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
