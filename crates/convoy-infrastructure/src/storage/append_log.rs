//! Locked, durable appends of single JSON lines.

use super::file_lock::{FileLock, LockStatus};
use convoy_core::config::LockStrategy;
use convoy_core::error::{ConvoyError, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::Path;

/// Outcome of one append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub lock: LockStatus,
}

/// Appends one record per call to a JSONL file.
///
/// Provides:
/// - **Append-only**: the file is opened with `O_APPEND`, never truncated
/// - **Isolation**: an exclusive advisory lock is held for the write
/// - **Atomicity**: the line and its newline go out in a single write
/// - **Durability**: `sync_data` before the lock is released
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendLog {
    strategy: LockStrategy,
}

impl AppendLog {
    pub fn new(strategy: LockStrategy) -> Self {
        Self { strategy }
    }

    /// Appends `line` plus a trailing newline to `path`.
    ///
    /// `line` must not contain a newline itself.
    pub fn append_line(&self, path: &Path, line: &str) -> Result<AppendOutcome> {
        if line.contains('\n') {
            return Err(ConvoyError::internal(format!(
                "refusing to append a multi-line record to {}",
                path.display()
            )));
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let lock = FileLock::acquire(file, self.strategy, path)?;

        let mut buffer = String::with_capacity(line.len() + 1);
        buffer.push_str(line);
        buffer.push('\n');

        let mut handle = lock.file();
        handle.write_all(buffer.as_bytes())?;
        handle.sync_data()?;

        Ok(AppendOutcome {
            lock: lock.status(),
        })
    }

    /// Serializes `record` as compact JSON and appends it.
    pub fn append_record<T: Serialize>(&self, path: &Path, record: &T) -> Result<AppendOutcome> {
        let line = serde_json::to_string(record)?;
        self.append_line(path, &line)
    }
}
