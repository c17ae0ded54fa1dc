//! Exclusive advisory locks on session files.

use convoy_core::config::LockStrategy;
use convoy_core::error::{ConvoyError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// What a `FileLock` actually ended up holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// Exclusive advisory lock held.
    Held,
    /// Locking was requested but the filesystem does not support it.
    /// Writes are still whole, but writers are not mutually excluded.
    Degraded,
    /// Locking is turned off by configuration.
    Disabled,
}

/// A file lock guard that releases the lock when dropped.
pub struct FileLock {
    file: File,
    status: LockStatus,
}

impl FileLock {
    /// Takes an exclusive lock on an already opened file, blocking until it
    /// is free.
    pub fn acquire(file: File, strategy: LockStrategy, path: &Path) -> Result<Self> {
        let status = match strategy {
            LockStrategy::Disabled => LockStatus::Disabled,
            LockStrategy::Advisory => advisory_status(FileExt::lock_exclusive(&file), path)?,
        };
        Ok(Self { file, status })
    }

    /// Opens (creating if needed) a dedicated lock file and locks it.
    ///
    /// The lock file is never removed: deleting it while another process
    /// waits on it would let two writers lock different inodes.
    pub fn open_sidecar(lock_path: &Path, strategy: LockStrategy) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        Self::acquire(file, strategy, lock_path)
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn status(&self) -> LockStatus {
        self.status
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if self.status == LockStatus::Held {
            // Closing the handle would release it as well
            let _ = FileExt::unlock(&self.file);
        }
    }
}

/// Maps the outcome of an advisory lock attempt to the status it leaves.
fn advisory_status(attempt: io::Result<()>, path: &Path) -> Result<LockStatus> {
    match attempt {
        Ok(()) => Ok(LockStatus::Held),
        Err(e) if is_unsupported(&e) => {
            tracing::warn!(
                "[FileLock] Advisory locking unsupported for {}, continuing without mutual exclusion: {}",
                path.display(),
                e
            );
            Ok(LockStatus::Degraded)
        }
        Err(e) => Err(ConvoyError::Lock(format!(
            "Failed to acquire lock on {}: {}",
            path.display(),
            e
        ))),
    }
}

/// True when the filesystem cannot provide advisory locks at all
/// (e.g. `ENOLCK` from `flock` on NFS mounts).
fn is_unsupported(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::Unsupported {
        return true;
    }
    #[cfg(unix)]
    {
        matches!(
            err.raw_os_error(),
            Some(code) if code == libc::ENOLCK || code == libc::EOPNOTSUPP
        )
    }
    #[cfg(not(unix))]
    {
        false
    }
}
