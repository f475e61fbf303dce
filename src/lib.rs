//! # autounzip
//!
//! Find a ZIP archive and extract it concurrently with live progress.
//!
//! The archive is listed once by reading its central directory, then every
//! entry is extracted by its own task, with at most `workers` tasks in flight.
//! Each task opens an independent read handle, so no file cursor is shared.
//! Completed entries are counted under a lock and reported to a
//! [`ProgressSink`] in completion order.
//!
//! ## Features
//!
//! - STORED and DEFLATE entries, ZIP64 archives
//! - CRC-32 and length validation of every extracted file
//! - Zip-slip protection: entries escaping the destination are rejected
//! - Per-entry failures are isolated and reported together at the end
//! - Cooperative cancellation between dispatches
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> autounzip::Result<()> {
//!     let report = autounzip::extract_all(
//!         Path::new("archive.zip"),
//!         Path::new("out"),
//!         autounzip::default_workers(),
//!     )
//!     .await?;
//!     println!("{} entries -> {}", report.total_count, report.destination_dir.display());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod coordinator;
pub mod discover;
pub mod error;
pub mod io;
pub mod progress;
pub mod zip;

pub use archive::{ArchiveReader, extract_entry, list_entries};
pub use cli::Cli;
pub use coordinator::{
    DEFAULT_WORKERS, ExtractionReport, ParallelExtractor, default_workers, extract_all,
};
pub use discover::find_first_zip;
pub use error::{EntryFailure, Error, Result};
pub use io::{LocalFileReader, ReadAt};
pub use progress::{ConsoleProgress, NoProgress, ProgressCounter, ProgressEvent, ProgressSink};
pub use crate::zip::{EntryDescriptor, ZipExtractor};
