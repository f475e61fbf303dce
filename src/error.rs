//! Error types for autounzip.
//!
//! Listing failures ([`Error::ArchiveOpen`], [`Error::CorruptArchive`]) are fatal
//! and surface before any extraction starts. Per-entry failures are collected
//! into [`Error::PartialExtraction`] once every task has finished.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for autounzip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for autounzip
#[derive(Debug, Error)]
pub enum Error {
    /// The archive path does not exist or cannot be read
    #[error("cannot open archive '{}': {source}", .path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive (or one of its entries) is not well-formed
    #[error("corrupt archive: {reason}")]
    CorruptArchive { reason: String },

    /// Entry path resolves outside the destination directory
    #[error("entry '{entry}' escapes the destination directory")]
    PathTraversal { entry: String },

    /// Entry name cannot be turned into a filesystem path
    #[error("entry '{entry}' has an invalid name")]
    InvalidEntryName { entry: String },

    /// Entry uses a feature the reader does not handle (encryption, exotic compression)
    #[error("entry '{entry}' is not supported: {reason}")]
    UnsupportedEntry { entry: String, reason: String },

    /// One or more entries failed while the rest of the run completed
    #[error("{} of {total} entries failed to extract", .failures.len())]
    PartialExtraction {
        failures: Vec<EntryFailure>,
        total: usize,
    },

    /// The run was cancelled before every entry was dispatched
    #[error("extraction cancelled after {completed} of {total} entries")]
    Cancelled {
        completed: usize,
        total: usize,
        failures: Vec<EntryFailure>,
    },

    /// I/O error while writing the destination tree
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptArchive {
            reason: reason.into(),
        }
    }

    /// Maps a read error hit after the archive was opened.
    ///
    /// A short read means the file ends before a structure the directory points at,
    /// which is a malformed archive rather than an I/O fault.
    pub(crate) fn from_archive_read(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::corrupt("unexpected end of archive"),
            _ => Error::Io(e),
        }
    }

    /// True if the archive itself is malformed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Error::CorruptArchive { .. })
    }

    /// Failed entries carried by an aggregate error, empty for anything else.
    pub fn failures(&self) -> &[EntryFailure] {
        match self {
            Error::PartialExtraction { failures, .. } | Error::Cancelled { failures, .. } => {
                failures
            }
            _ => &[],
        }
    }
}

/// A single entry that could not be extracted
#[derive(Debug)]
pub struct EntryFailure {
    /// Entry name as stored in the archive
    pub name: String,
    /// Why it failed
    pub error: Error,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}
