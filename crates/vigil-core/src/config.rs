//! Vigil configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VigilError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VigilConfig {
    /// Directory containing job definition files (one JSON file per job).
    #[serde(default = "default_jobs_dir")]
    pub jobs_dir: PathBuf,
    /// Directory for persisted per-job state records.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// How often the jobs directory is rescanned for changes, in seconds.
    #[serde(default = "default_rescan_interval")]
    pub rescan_interval_secs: u64,
    /// SMTP settings for the email notifier. Jobs using the "email" notifier
    /// kind fail to load when this is absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

fn default_jobs_dir() -> PathBuf {
    VigilConfig::home_dir().join("jobs")
}

fn default_state_dir() -> PathBuf {
    VigilConfig::home_dir().join("states")
}

fn default_rescan_interval() -> u64 {
    60
}

impl Default for VigilConfig {
    fn default() -> Self {
        Self {
            jobs_dir: default_jobs_dir(),
            state_dir: default_state_dir(),
            rescan_interval_secs: default_rescan_interval(),
            email: None,
        }
    }
}

impl VigilConfig {
    /// Load config from the default path (~/.vigil/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VigilError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| VigilError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Vigil home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vigil")
    }
}

/// SMTP settings for the email notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}
