use crate::error::{ConvoyError, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static SESSION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[a-zA-Z0-9-]+$")
        .expect("session id pattern is a valid regex")
});

/// Slug used when a task description has no usable characters.
const FALLBACK_SLUG: &str = "session";

/// Identifier of a coordination session: `YYYY-MM-DD-HH-mm-<slug>`.
///
/// The ID is only ever used as a path key. It is validated on construction so
/// it can never escape the sessions root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validates and wraps an existing session ID.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if SESSION_ID_PATTERN.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(ConvoyError::InvalidSessionId(value))
        }
    }

    /// Builds a new session ID from a timestamp and a free-form task description.
    pub fn generate(task: &str, at: DateTime<Utc>) -> Self {
        let slug = slugify(task);
        let slug = if slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            slug
        };
        Self(format!("{}-{}", at.format("%Y-%m-%d-%H-%M"), slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercases, maps every run of non-alphanumeric characters to one hyphen
/// and trims hyphens at both ends.
pub fn slugify(task: &str) -> String {
    let mut slug = String::with_capacity(task.len());
    let mut pending_hyphen = false;
    for ch in task.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = ConvoyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = ConvoyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
