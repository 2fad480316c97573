//! Chapter archive writing.
//!
//! Archives are plain zip containers (`.cbz` by default) with one stored
//! entry per page image, in the order given.

use crate::error::MangaError;
use bytes::Bytes;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// A named page image to store in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Bytes,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Writes `entries` into a new archive at `path`, replacing any existing file.
///
/// Runs on the blocking pool. Parent directories are created as needed.
#[instrument(skip(entries), fields(count = entries.len()))]
pub async fn write_archive(path: &Path, entries: Vec<ArchiveEntry>) -> Result<PathBuf, MangaError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_archive_blocking(&path, &entries).map(|_| path))
        .await?
}

fn write_archive_blocking(path: &Path, entries: &[ArchiveEntry]) -> Result<(), MangaError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    // Images are already compressed.
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }

    zip.finish()?;
    debug!(path = %path.display(), "archive written");
    Ok(())
}
