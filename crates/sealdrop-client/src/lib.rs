//! Client pipelines for a sealdrop drop service.
//!
//! [`SealdropClient`] owns the HTTP client, the service base URL, and the
//! upload cooldown gate. The upload and download pipelines live in their own
//! modules as `impl` blocks on the client; [`cooldown`] is the pure gate
//! state machine they share.

pub mod cooldown;
pub mod download;
pub mod upload;

pub use cooldown::{CooldownGate, CooldownSnapshot};
pub use download::DownloadedFile;
pub use upload::{ProgressFn, UploadOutcome};

use std::time::Duration;

use sealdrop_core::config::SealdropConfig;

pub struct SealdropClient {
    http: reqwest::Client,
    base_url: String,
    gate: CooldownGate,
    batch_name: String,
    max_upload_bytes: u64,
}

impl SealdropClient {
    pub fn new(config: &SealdropConfig) -> Self {
        let gate = CooldownGate::new(Duration::from_secs(config.upload.cooldown_secs));
        Self::with_gate(config, gate)
    }

    /// Build with a pre-populated gate (e.g. restored from a state file).
    pub fn with_gate(config: &SealdropConfig, gate: CooldownGate) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            gate,
            batch_name: config.upload.batch_name.clone(),
            max_upload_bytes: config.max_upload_bytes(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut CooldownGate {
        &mut self.gate
    }
}
