//! Log root resolution.
//!
//! Maps the deployment mode to the directory where logs live: next to the
//! process in development, under the per-user data directory in production.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LogConfig;

/// Where the application is running, which decides the log root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Logs go into `logs/` under the process working directory.
    Development,
    /// Logs go under the per-user data directory, namespaced by vendor
    /// and application.
    Production,
}

impl DeployMode {
    /// Pick the mode matching the build profile.
    pub fn detect() -> Self {
        if cfg!(debug_assertions) {
            DeployMode::Development
        } else {
            DeployMode::Production
        }
    }
}

/// Resolve the log root directory for `config`.
///
/// An explicit `config.directory` wins over mode-based resolution. The
/// result is deterministic for a given mode and environment; no directory
/// is created here.
pub fn resolve_log_root(config: &LogConfig) -> PathBuf {
    if let Some(dir) = &config.directory {
        return dir.clone();
    }

    match config.mode {
        DeployMode::Development => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs"),
        DeployMode::Production => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&config.vendor)
            .join(&config.application)
            .join("logs"),
    }
}

/// Create `path` (and any missing ancestors) if absent. No-op when the
/// directory already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}
