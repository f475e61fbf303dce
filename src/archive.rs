//! Path-based access to a ZIP archive.
//!
//! Nothing here keeps the archive open: every call opens its own handle and
//! drops it before returning, so any number of tasks may call into the same
//! [`ArchiveReader`] at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::io::LocalFileReader;
use crate::zip::{EntryDescriptor, ZipExtractor};

/// A ZIP archive identified by its path on disk
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    path: PathBuf,
}

impl ArchiveReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<ZipExtractor<LocalFileReader>> {
        let reader = LocalFileReader::new(&self.path)?;
        Ok(ZipExtractor::new(Arc::new(reader)))
    }

    /// Read the central directory and return every entry in archive order.
    pub async fn list_entries(&self) -> Result<Vec<EntryDescriptor>> {
        self.open()?.list_entries().await
    }

    /// Extract one entry beneath `destination_dir`, returning its relative path.
    ///
    /// Existing files at the target are overwritten without prompting.
    pub async fn extract_entry(
        &self,
        entry: &EntryDescriptor,
        destination_dir: &Path,
    ) -> Result<PathBuf> {
        self.open()?.extract_into(entry, destination_dir).await
    }
}

/// Shorthand for [`ArchiveReader::list_entries`].
pub async fn list_entries(archive_path: &Path) -> Result<Vec<EntryDescriptor>> {
    ArchiveReader::new(archive_path).list_entries().await
}

/// Shorthand for [`ArchiveReader::extract_entry`].
pub async fn extract_entry(
    archive_path: &Path,
    entry: &EntryDescriptor,
    destination_dir: &Path,
) -> Result<PathBuf> {
    ArchiveReader::new(archive_path)
        .extract_entry(entry, destination_dir)
        .await
}
