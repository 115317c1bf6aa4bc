//! Persisted cooldown state — keeps the upload gate honest across
//! short-lived CLI invocations. JSON on disk, flushed atomically via
//! temp+rename.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

use sealdrop_client::CooldownSnapshot;

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted snapshot. A missing file means an idle gate; an
    /// unreadable file is discarded with a warning rather than blocking the
    /// upload.
    pub fn load(&self) -> Result<CooldownSnapshot> {
        if !self.path.exists() {
            return Ok(CooldownSnapshot::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file: {}", self.path.display()))?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable state file");
                Ok(CooldownSnapshot::default())
            }
        }
    }

    pub fn store(&self, snapshot: &CooldownSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating state dir: {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(snapshot)?;
        std::fs::write(&tmp, content)
            .with_context(|| format!("writing state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing state file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_idle() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = StateFile::new(tmp.path().join("state.json"));
        assert!(state.load().unwrap().deadline_unix_ms.is_none());
    }

    #[test]
    fn test_store_load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = StateFile::new(tmp.path().join("nested/dir/state.json"));

        let snapshot = CooldownSnapshot {
            deadline_unix_ms: Some(1_700_000_123_456),
        };
        state.store(&snapshot).unwrap();

        let loaded = state.load().unwrap();
        assert_eq!(loaded.deadline_unix_ms, Some(1_700_000_123_456));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_idle() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let state = StateFile::new(path);
        assert!(state.load().unwrap().deadline_unix_ms.is_none());
    }
}
