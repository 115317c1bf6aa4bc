use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SealError, SealResult};

/// Top-level client configuration (loaded from sealdrop.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealdropConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the drop service (no trailing slash)
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Seconds a new upload attempt is blocked after the previous one
    pub cooldown_secs: u64,
    /// Countdown refresh interval in milliseconds (display only)
    pub poll_interval_ms: u64,
    /// Archive name used when bundling two or more files
    pub batch_name: String,
    /// Reject payloads larger than this before transfer (server enforces the
    /// same limit on its side)
    pub max_upload_mb: u64,
    /// Cooldown state file (default: ~/.local/share/sealdrop/state.json)
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 60,
            poll_interval_ms: 500,
            batch_name: "batch_upload.zip".into(),
            max_upload_mb: 100,
            state_file: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl SealdropConfig {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> SealResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SealError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.upload.max_upload_mb * 1024 * 1024
    }
}
