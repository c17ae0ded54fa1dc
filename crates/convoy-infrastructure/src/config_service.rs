//! Configuration service implementation.
//!
//! Loads `CoordinationConfig` from `config.toml` (~/.config/convoy/config.toml
//! unless a path is given) and applies environment overrides.

use crate::paths::ConvoyPaths;
use convoy_core::config::CoordinationConfig;
use convoy_core::error::{ConvoyError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `sessions_root`.
pub const SESSIONS_ROOT_ENV: &str = "CONVOY_SESSIONS_ROOT";

pub struct ConfigService;

impl ConfigService {
    /// Resolves the effective configuration.
    ///
    /// 1. `explicit` path if given (must exist)
    /// 2. the platform config file if present
    /// 3. defaults, with sessions under the platform data directory
    ///
    /// `CONVOY_SESSIONS_ROOT` then overrides `sessions_root`.
    pub fn load(explicit: Option<&Path>) -> Result<CoordinationConfig> {
        let config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => match ConvoyPaths::config_file() {
                Ok(path) if path.is_file() => Self::load_file(&path)?,
                _ => Self::platform_defaults(),
            },
        };

        Ok(Self::apply_env_override(
            config,
            std::env::var(SESSIONS_ROOT_ENV).ok(),
        ))
    }

    /// Parses one TOML config file.
    ///
    /// A relative `sessions_root` is resolved against the file's directory.
    pub fn load_file(path: &Path) -> Result<CoordinationConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvoyError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config: CoordinationConfig =
            toml::from_str(&content).map_err(|e| ConvoyError::Serialization {
                format: "TOML".to_string(),
                message: format!("{}: {}", path.display(), e),
            })?;

        if config.sessions_root.is_relative() {
            if let Some(base) = path.parent() {
                config.sessions_root = base.join(&config.sessions_root);
            }
        }

        tracing::debug!(
            "[ConfigService] Loaded {} (sessions_root={})",
            path.display(),
            config.sessions_root.display()
        );
        Ok(config)
    }

    /// Replaces `sessions_root` with a non-empty override value.
    pub fn apply_env_override(
        mut config: CoordinationConfig,
        sessions_root: Option<String>,
    ) -> CoordinationConfig {
        if let Some(root) = sessions_root.filter(|root| !root.trim().is_empty()) {
            config.sessions_root = PathBuf::from(root);
        }
        config
    }

    fn platform_defaults() -> CoordinationConfig {
        match ConvoyPaths::sessions_dir() {
            Ok(sessions_root) => CoordinationConfig::with_sessions_root(sessions_root),
            Err(e) => {
                tracing::warn!("[ConfigService] {}; using ./sessions", e);
                CoordinationConfig::default()
            }
        }
    }
}
