use thiserror::Error;

pub type SealResult<T> = Result<T, SealError>;

#[derive(Debug, Error)]
pub enum SealError {
    /// Rejected before any state change; the upload cooldown is not engaged.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A previous upload attempt is still cooling down.
    #[error("please wait {0} second(s) before uploading again")]
    CooldownActive(u64),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Non-2xx response or network failure while uploading.
    #[error("upload failed: {0}")]
    Transfer(String),

    /// Network failure while retrieving a stored blob.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Wrong passphrase, corrupted blob, and truncated blob are deliberately
    /// not distinguished.
    #[error("incorrect passphrase or corrupted file")]
    WrongPasswordOrCorrupted,

    #[error("archive error: {0}")]
    Archive(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
