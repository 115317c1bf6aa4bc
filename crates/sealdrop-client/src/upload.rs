//! Upload pipeline: validate → cooldown gate → bundle-or-single → encrypt →
//! multipart POST → link extraction.
//!
//! One pipeline parameterized by entry count: a single file keeps its own
//! name and skips the archive wrapper; two or more files are zipped under
//! the configured batch name first.

use std::time::SystemTime;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use sealdrop_core::{FileEntry, SealError, SealResult};

use crate::SealdropClient;

/// Marker the server prints ahead of the retrievable URL.
const LINK_MARKER: &str = "Download at: ";

/// Progress callback (bytes_sent, bytes_total); invoked at least at transfer
/// start and completion.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Result of one upload attempt, built once from the server response.
#[derive(Debug)]
pub struct UploadOutcome {
    pub success: bool,
    pub download_link: Option<String>,
    pub error: Option<String>,
}

impl UploadOutcome {
    fn succeeded(download_link: Option<String>) -> Self {
        Self {
            success: true,
            download_link,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            download_link: None,
            error: Some(message),
        }
    }
}

impl SealdropClient {
    /// Encrypt the selected files and submit them as one blob.
    ///
    /// Precondition violations (no files, empty passphrase, oversized
    /// payload) are rejected before the cooldown is engaged. Once an attempt
    /// is accepted the gate stays cooling after success, and is force-reset
    /// on any failure so a corrected retry is not penalized.
    pub async fn upload(
        &mut self,
        entries: &[FileEntry],
        passphrase: &SecretString,
        progress: Option<&ProgressFn>,
    ) -> SealResult<UploadOutcome> {
        if entries.is_empty() {
            return Err(SealError::InvalidInput("no files selected".into()));
        }
        if passphrase.expose_secret().is_empty() {
            return Err(SealError::InvalidInput("encryption passphrase is empty".into()));
        }
        let payload_bytes: u64 = entries.iter().map(|e| e.len() as u64).sum();
        if payload_bytes > self.max_upload_bytes {
            return Err(SealError::InvalidInput(format!(
                "selected files total {payload_bytes} bytes, limit is {} bytes",
                self.max_upload_bytes
            )));
        }

        // Cooling starts synchronously on acceptance, before the first
        // await, closing the window between two back-to-back triggers.
        self.gate
            .try_begin(SystemTime::now())
            .map_err(|remaining| {
                SealError::CooldownActive(remaining.as_millis().div_ceil(1000) as u64)
            })?;

        match self.run_upload(entries, passphrase, progress).await {
            Ok(outcome) => {
                if !outcome.success {
                    self.gate.reset();
                }
                Ok(outcome)
            }
            Err(e) => {
                self.gate.reset();
                Err(e)
            }
        }
    }

    async fn run_upload(
        &self,
        entries: &[FileEntry],
        passphrase: &SecretString,
        progress: Option<&ProgressFn>,
    ) -> SealResult<UploadOutcome> {
        let (upload_name, payload) = if entries.len() == 1 {
            (entries[0].name.clone(), entries[0].bytes.clone())
        } else {
            (self.batch_name.clone(), sealdrop_archive::bundle(entries)?)
        };
        debug!(
            name = %upload_name,
            files = entries.len(),
            bytes = payload.len(),
            "payload assembled"
        );

        let armored = sealdrop_crypto::encrypt(&payload, passphrase)
            .map_err(|e| SealError::Encryption(e.to_string()))?;

        let total = armored.len() as u64;
        if let Some(report) = progress {
            report(0, total);
        }

        let part = reqwest::multipart::Part::bytes(armored.into_bytes())
            .file_name(upload_name)
            .mime_str("text/plain")
            .map_err(|e| SealError::Transfer(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/upload", self.base_url);
        info!(%url, bytes = total, "uploading");
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SealError::Transfer(format!("sending to {url}: {e}")))?;

        if let Some(report) = progress {
            report(total, total);
        }

        let status = response.status();
        if !status.is_success() {
            // Surface the status text verbatim, with body detail when the
            // server sent any. No automatic retry.
            let mut message = status
                .canonical_reason()
                .unwrap_or("upload rejected")
                .to_string();
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            if !body.is_empty() && body != message {
                message = format!("{message}: {body}");
            }
            warn!(%status, "upload rejected by server");
            return Ok(UploadOutcome::failed(message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SealError::Transfer(format!("reading response: {e}")))?;
        let link = extract_link(&body);
        match &link {
            Some(link) => info!(%link, "upload complete"),
            // Transfer still counts as successful without a link.
            None => debug!("response carried no download link marker"),
        }
        Ok(UploadOutcome::succeeded(link))
    }
}

/// Extract the URL token following the first `Download at: ` marker.
fn extract_link(body: &str) -> Option<String> {
    let (_, rest) = body.split_once(LINK_MARKER)?;
    rest.split_whitespace().next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_link() {
        let body = "File uploaded successfully. Download at: http://host/uploads/abc123.txt";
        assert_eq!(
            extract_link(body),
            Some("http://host/uploads/abc123.txt".into())
        );
    }

    #[test]
    fn test_extract_link_trims_trailing_text() {
        let body = "Download at: https://host/f/abc123\nthanks";
        assert_eq!(extract_link(body), Some("https://host/f/abc123".into()));
    }

    #[test]
    fn test_extract_link_missing_marker() {
        assert_eq!(extract_link("upload stored"), None);
    }

    #[test]
    fn test_extract_link_marker_without_url() {
        assert_eq!(extract_link("Download at:   "), None);
    }
}
