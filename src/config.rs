use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths::DeployMode;

/// Logging configuration, read once when the service initializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Deployment mode controlling where the log root lives.
    #[serde(default = "DeployMode::detect")]
    pub mode: DeployMode,

    /// Vendor namespace for the production log root.
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// Application namespace for the production log root.
    #[serde(default = "default_application")]
    pub application: String,

    /// Explicit log directory. When set, mode-based resolution is skipped.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// How many rotated, uncompressed files the sink keeps. Older files
    /// become archival candidates on a later startup.
    #[serde(default = "default_retention_count")]
    pub retention_count: usize,

    /// Active log file name prefix.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Active log file extension, without the dot.
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

fn default_vendor() -> String {
    "Logkeeper".to_string()
}

fn default_application() -> String {
    "logkeeper".to_string()
}

fn default_retention_count() -> usize {
    7
}

fn default_file_prefix() -> String {
    "log".to_string()
}

fn default_file_suffix() -> String {
    "txt".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            mode: DeployMode::detect(),
            vendor: default_vendor(),
            application: default_application(),
            directory: None,
            retention_count: default_retention_count(),
            file_prefix: default_file_prefix(),
            file_suffix: default_file_suffix(),
        }
    }
}

impl LogConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: LogConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(LogConfig::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logkeeper")
            .join("config.toml")
    }
}
