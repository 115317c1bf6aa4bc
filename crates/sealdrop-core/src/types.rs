use std::path::Path;

use crate::error::{SealError, SealResult};

/// A named byte buffer selected for upload.
///
/// Built once from a local file (or directly from parts in tests) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Base file name, extension included.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a local file into an entry named after its base file name.
    pub fn from_path(path: &Path) -> SealResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SealError::InvalidInput(format!("not a readable file name: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_uses_base_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("report.pdf");
        std::fs::write(&path, b"abc").unwrap();

        let entry = FileEntry::from_path(&path).unwrap();
        assert_eq!(entry.name, "report.pdf");
        assert_eq!(entry.bytes, b"abc");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = FileEntry::from_path(Path::new("/no/such/file.bin"));
        assert!(matches!(result, Err(SealError::Io(_))));
    }
}
