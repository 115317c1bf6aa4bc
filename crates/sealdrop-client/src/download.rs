//! Download pipeline: fetch the raw armored blob, decrypt it, deliver the
//! recovered bytes under the stored identifier's name.

use secrecy::SecretString;
use tracing::info;

use sealdrop_core::{SealError, SealResult};

use crate::SealdropClient;

/// Recovered plaintext, named after the stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SealdropClient {
    /// Fetch the blob stored under `identifier` and decrypt it.
    ///
    /// No cooldown applies here; a download may run alongside an in-flight
    /// upload. Fetch failures are fatal to the attempt — no retry.
    pub async fn download(
        &self,
        identifier: &str,
        passphrase: &SecretString,
    ) -> SealResult<DownloadedFile> {
        if identifier.is_empty() {
            return Err(SealError::InvalidInput("no file specified".into()));
        }

        let url = format!("{}/uploads/{identifier}/raw", self.base_url);
        info!(%url, "fetching stored blob");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SealError::FetchFailed(format!("requesting {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SealError::FetchFailed(format!(
                "server returned {status} for {identifier}"
            )));
        }
        let blob = response
            .bytes()
            .await
            .map_err(|e| SealError::FetchFailed(format!("reading body: {e}")))?;

        let bytes = sealdrop_crypto::decrypt(&blob, passphrase).map_err(|e| match e {
            sealdrop_crypto::CryptoError::EmptyPassphrase => {
                SealError::InvalidInput("decryption passphrase is empty".into())
            }
            _ => SealError::WrongPasswordOrCorrupted,
        })?;

        info!(bytes = bytes.len(), "decrypted");
        Ok(DownloadedFile {
            name: identifier.to_string(),
            bytes,
        })
    }
}
