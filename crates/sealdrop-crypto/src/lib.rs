//! Passphrase symmetric encryption (age 0.11 API, scrypt recipient).
//!
//! The armored output is self-describing: the scrypt stanza embeds the salt
//! and work factor, so decryption needs nothing beyond the blob and the
//! passphrase. Wrong passphrase, corrupted armor, and truncation all
//! collapse into one `Unreadable` condition on purpose — callers are not
//! supposed to learn which of the three happened.

use std::io::{Read, Write};
use std::iter;

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Wrong passphrase, corrupted blob, or truncated blob.
    #[error("unreadable ciphertext")]
    Unreadable,
}

fn scrypt_passphrase(passphrase: &SecretString) -> SecretString {
    // age's scrypt recipient/identity take an owned SecretString
    SecretString::from(passphrase.expose_secret().to_owned())
}

/// Encrypt `plaintext` under `passphrase`, returning armored age ciphertext.
///
/// Fails only on an empty passphrase or an internal cipher setup error,
/// never on plaintext content.
pub fn encrypt(plaintext: &[u8], passphrase: &SecretString) -> Result<String, CryptoError> {
    if passphrase.expose_secret().is_empty() {
        return Err(CryptoError::EmptyPassphrase);
    }

    let recipient = age::scrypt::Recipient::new(scrypt_passphrase(passphrase));
    let encryptor = age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut armored_bytes = Vec::new();
    let armor = ArmoredWriter::wrap_output(&mut armored_bytes, Format::AsciiArmor)
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;
    let mut writer = encryptor
        .wrap_output(armor)
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;
    writer
        .write_all(plaintext)
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;
    let armor = writer
        .finish()
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;
    armor
        .finish()
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    debug!(plaintext_bytes = plaintext.len(), "encrypted");
    String::from_utf8(armored_bytes)
        .map_err(|_| CryptoError::Encrypt("armor output was not UTF-8".into()))
}

/// Decrypt an armored age blob with `passphrase`.
///
/// Any failure to recover a non-empty plaintext is reported as
/// [`CryptoError::Unreadable`], including a zero-length result — the same
/// merged condition the service has always exposed.
pub fn decrypt(armored: &[u8], passphrase: &SecretString) -> Result<Vec<u8>, CryptoError> {
    if passphrase.expose_secret().is_empty() {
        return Err(CryptoError::EmptyPassphrase);
    }

    let decryptor =
        age::Decryptor::new(ArmoredReader::new(armored)).map_err(|_| CryptoError::Unreadable)?;

    let identity = age::scrypt::Identity::new(scrypt_passphrase(passphrase));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|_| CryptoError::Unreadable)?;

    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(|_| CryptoError::Unreadable)?;

    if plaintext.is_empty() {
        return Err(CryptoError::Unreadable);
    }

    debug!(plaintext_bytes = plaintext.len(), "decrypted");
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passphrase(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_roundtrip() {
        let plaintext = b"the quick brown fox";
        let blob = encrypt(plaintext, &passphrase("hunter2")).unwrap();

        assert!(blob.starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
        assert!(blob.trim_end().ends_with("-----END AGE ENCRYPTED FILE-----"));

        let recovered = decrypt(blob.as_bytes(), &passphrase("hunter2")).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_wrong_passphrase_is_unreadable() {
        let blob = encrypt(b"secret", &passphrase("correct")).unwrap();
        let result = decrypt(blob.as_bytes(), &passphrase("wrong"));
        assert!(matches!(result, Err(CryptoError::Unreadable)));
    }

    #[test]
    fn test_corrupted_blob_is_unreadable() {
        let blob = encrypt(b"secret", &passphrase("pw")).unwrap();
        let corrupted = blob.replace("AGE", "EGA");
        let result = decrypt(corrupted.as_bytes(), &passphrase("pw"));
        assert!(matches!(result, Err(CryptoError::Unreadable)));
    }

    #[test]
    fn test_truncated_blob_is_unreadable() {
        let blob = encrypt(b"some longer secret payload", &passphrase("pw")).unwrap();
        let truncated = &blob.as_bytes()[..blob.len() / 2];
        let result = decrypt(truncated, &passphrase("pw"));
        assert!(matches!(result, Err(CryptoError::Unreadable)));
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(matches!(
            encrypt(b"data", &passphrase("")),
            Err(CryptoError::EmptyPassphrase)
        ));
        assert!(matches!(
            decrypt(b"blob", &passphrase("")),
            Err(CryptoError::EmptyPassphrase)
        ));
    }

    #[test]
    fn test_empty_plaintext_encrypts_but_reads_back_unreadable() {
        // Merged-failure policy: a zero-length result is indistinguishable
        // from a failed decrypt, so an empty plaintext cannot round-trip.
        let blob = encrypt(b"", &passphrase("pw")).unwrap();
        let result = decrypt(blob.as_bytes(), &passphrase("pw"));
        assert!(matches!(result, Err(CryptoError::Unreadable)));
    }

    #[test]
    fn test_binary_plaintext_roundtrip() {
        let plaintext: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let blob = encrypt(&plaintext, &passphrase("binary pw")).unwrap();
        let recovered = decrypt(blob.as_bytes(), &passphrase("binary pw")).unwrap();
        assert_eq!(recovered, plaintext);
    }
}
