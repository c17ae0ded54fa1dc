//! Patch application for state documents.

use crate::error::{ConvoyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// How a patch is folded into the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Objects merge key by key, recursively. Every other value (arrays
    /// included) replaces what was there.
    #[default]
    Deep,
    /// Top-level keys of the patch replace top-level keys of the document.
    Shallow,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Deep => f.write_str("deep"),
            MergeStrategy::Shallow => f.write_str("shallow"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "deep" => Ok(MergeStrategy::Deep),
            "shallow" => Ok(MergeStrategy::Shallow),
            other => Err(format!("unknown merge strategy: {}", other)),
        }
    }
}

/// Recursively merges `patch` into `target`.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && patch_value.is_object() => {
                        deep_merge(existing, patch_value);
                    }
                    _ => {
                        target_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Applies `patch` to `document` with the given strategy.
///
/// Both must be JSON objects.
pub fn apply_patch(document: &mut Value, patch: &Value, strategy: MergeStrategy) -> Result<()> {
    let Some(patch_map) = patch.as_object() else {
        return Err(ConvoyError::InvalidPatch(format!(
            "expected a JSON object, got {}",
            json_kind(patch)
        )));
    };
    if !document.is_object() {
        return Err(ConvoyError::internal("state document is not a JSON object"));
    }

    match strategy {
        MergeStrategy::Deep => deep_merge(document, patch),
        MergeStrategy::Shallow => {
            if let Some(document_map) = document.as_object_mut() {
                for (key, patch_value) in patch_map {
                    document_map.insert(key.clone(), patch_value.clone());
                }
            }
        }
    }
    Ok(())
}

/// Sets `timestamps.updated_at` and `timestamps.last_heartbeat` to `now`.
pub fn touch_timestamps(document: &mut Value, now: &str) {
    let Some(document_map) = document.as_object_mut() else {
        return;
    };
    let timestamps = document_map
        .entry("timestamps")
        .or_insert_with(|| Value::Object(Map::new()));
    if !timestamps.is_object() {
        *timestamps = Value::Object(Map::new());
    }
    if let Some(map) = timestamps.as_object_mut() {
        map.insert("updated_at".to_string(), Value::String(now.to_string()));
        map.insert("last_heartbeat".to_string(), Value::String(now.to_string()));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
