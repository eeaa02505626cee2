//! Configuration management for studydesk tools

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Global studydesk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the study backend (e.g. http://localhost:5000).
    /// When unset, tools fall back to local storage.
    #[serde(default)]
    pub server_url: Option<String>,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default work interval (minutes)
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    /// Default short break (minutes)
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// Default long break (minutes)
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            timeout_secs: default_timeout_secs(),
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
