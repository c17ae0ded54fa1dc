//! Unified path management for convoy configuration and session data.

use std::path::PathBuf;

const APP_DIR: &str = "convoy";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform-specific default locations.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/convoy/            # Config directory
/// └── config.toml              # Coordination configuration
///
/// ~/.local/share/convoy/       # Data directory
/// └── sessions/                # One directory per session
/// ```
pub struct ConvoyPaths;

impl ConvoyPaths {
    /// Returns the convoy configuration directory (e.g., `~/.config/convoy/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the convoy data directory (e.g., `~/.local/share/convoy/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default sessions root.
    pub fn sessions_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("sessions"))
    }
}
