//! A single JSON document on disk with atomic replacement.
//!
//! Returns data as `serde_json::Value`; callers own the schema.

use super::file_lock::FileLock;
use convoy_core::config::LockStrategy;
use convoy_core::error::{ConvoyError, Result};
use serde_json::Value;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// A JSON document file with ACID-style guarantees.
///
/// Responsibilities:
/// - **File locking** (exclusive lock on a sidecar lock file)
/// - **Atomic replacement** (tmp file + fsync + rename)
///
/// Does NOT:
/// - Know about sessions or the state schema
/// - Decide what a missing document means (delegated to the caller)
pub struct JsonDocumentFile {
    path: PathBuf,
    lock_path: PathBuf,
    strategy: LockStrategy,
}

impl JsonDocumentFile {
    /// # Arguments
    ///
    /// * `path` - The document file
    /// * `lock_path` - Sidecar file the exclusive lock is taken on
    /// * `strategy` - Whether to lock at all
    pub fn new(path: PathBuf, lock_path: PathBuf, strategy: LockStrategy) -> Self {
        Self {
            path,
            lock_path,
            strategy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and parses the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Value))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist
    /// - `Err(ConvoyError::CorruptState)`: File is empty or not valid JSON
    /// - `Err(ConvoyError::Io)`: File exists but could not be read
    pub fn load(&self) -> Result<Option<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Err(ConvoyError::corrupt_state(&self.path, "file is empty"));
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConvoyError::corrupt_state(&self.path, e.to_string()))
    }

    /// Writes the document atomically.
    ///
    /// Callers that may race with other writers must hold `lock()`.
    pub fn save(&self, data: &Value) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut json_string = serde_json::to_string_pretty(data)?;
        json_string.push('\n');

        // Per-write temporary file in the same directory; unlocked writers
        // must never share one
        let (parent, file_name) = self.split_path()?;
        let mut tmp_file = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(parent)?;
        tmp_file.write_all(json_string.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.as_file().sync_all()?;

        // Atomic rename
        tmp_file.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Acquires the exclusive lock guarding this document.
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::open_sidecar(&self.lock_path, self.strategy)
    }

    /// Locked read-modify-write.
    ///
    /// `f` receives the current document (`None` if the file doesn't exist)
    /// and returns the document to write. If `f` fails nothing is written.
    pub fn update<F>(&self, f: F) -> Result<Value>
    where
        F: FnOnce(Option<Value>) -> Result<Value>,
    {
        let _lock = self.lock()?;
        let current = self.load()?;
        let next = f(current)?;
        self.save(&next)?;
        Ok(next)
    }

    fn split_path(&self) -> Result<(&Path, String)> {
        let parent = self.path.parent().ok_or_else(|| {
            ConvoyError::io(format!("{} has no parent directory", self.path.display()))
        })?;
        let file_name = self.path.file_name().ok_or_else(|| {
            ConvoyError::io(format!("{} has no file name", self.path.display()))
        })?;
        Ok((parent, file_name.to_string_lossy().into_owned()))
    }
}
