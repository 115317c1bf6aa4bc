//! Zip bundling for multi-file uploads.
//!
//! `bundle` packs named byte buffers into one zip so a batch of files can be
//! encrypted and uploaded as a single blob. `unbundle` is the inverse; the
//! uploader never calls it, but downstream consumers of a recovered batch do,
//! and the round-trip property is what the tests pin down.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

use sealdrop_core::{FileEntry, SealError, SealResult};

/// Sanitize an entry name to its base name (strips path components like
/// `../`) so a crafted name cannot escape the extraction directory.
fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Combine entries into a single zip archive (Deflate).
///
/// Empty input is a caller error: the upload pipeline only bundles when at
/// least two files were selected.
pub fn bundle(entries: &[FileEntry]) -> SealResult<Vec<u8>> {
    if entries.is_empty() {
        return Err(SealError::InvalidInput("no files to bundle".into()));
    }

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (i, entry) in entries.iter().enumerate() {
            let safe_name = sanitize_entry_name(&entry.name, &format!("unnamed_{i}"));
            zip.start_file(&safe_name, options)
                .map_err(|e| SealError::Archive(format!("adding {safe_name}: {e}")))?;
            zip.write_all(&entry.bytes)?;
        }

        zip.finish()
            .map_err(|e| SealError::Archive(format!("finalizing archive: {e}")))?;
    }

    debug!(files = entries.len(), bytes = buffer.len(), "bundled");
    Ok(buffer)
}

/// Read every regular file entry back out of a zip archive.
pub fn unbundle(bytes: &[u8]) -> SealResult<Vec<FileEntry>> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SealError::Archive(format!("reading archive: {e}")))?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| SealError::Archive(format!("entry {i}: {e}")))?;
        if !file.is_file() {
            continue;
        }
        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        entries.push(FileEntry::new(file.name().to_string(), content));
    }

    Ok(entries)
}
