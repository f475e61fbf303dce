//! Parallel extraction of every entry in an archive.
//!
//! The central directory is listed once, then one task per entry is spawned
//! onto the tokio runtime. A semaphore bounds how many of them exist at a
//! time. Every task is joined before the outcome is decided, so the returned
//! error accounts for all failed entries.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::archive::ArchiveReader;
use crate::error::{EntryFailure, Error, Result};
use crate::progress::{NoProgress, ProgressCounter, ProgressSink};
use crate::zip::EntryDescriptor;

/// Worker count used when the platform cannot report its parallelism
pub const DEFAULT_WORKERS: usize = 4;

/// Available hardware parallelism, or [`DEFAULT_WORKERS`] if unknown.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_WORKERS)
}

/// Outcome of a fully successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Entries listed in the archive (files and directories)
    pub total_count: usize,
    pub destination_dir: PathBuf,
    pub files_extracted: usize,
    pub directories_created: usize,
    /// Sum of the uncompressed sizes of extracted files
    pub bytes_written: u64,
}

impl ExtractionReport {
    fn empty(total_count: usize, destination_dir: &Path) -> Self {
        Self {
            total_count,
            destination_dir: destination_dir.to_path_buf(),
            files_extracted: 0,
            directories_created: 0,
            bytes_written: 0,
        }
    }
}

/// Extracts all entries of one archive using a bounded pool of tasks.
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use autounzip::{ConsoleProgress, ParallelExtractor};
///
/// # async fn run() -> autounzip::Result<()> {
/// let report = ParallelExtractor::new("photos.zip")
///     .workers(8)
///     .progress(Arc::new(ConsoleProgress::default()))
///     .extract_to(Path::new("out"))
///     .await?;
/// println!("{} entries", report.total_count);
/// # Ok(())
/// # }
/// ```
pub struct ParallelExtractor {
    archive: ArchiveReader,
    workers: usize,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl ParallelExtractor {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive: ArchiveReader::new(archive_path),
            workers: DEFAULT_WORKERS,
            progress: Arc::new(NoProgress),
            cancel: CancellationToken::new(),
        }
    }

    /// Maximum number of entries extracted at once.
    ///
    /// Clamped to at least 1 and at most [`Semaphore::MAX_PERMITS`].
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Token checked before each entry is dispatched.
    ///
    /// Cancelling stops further dispatch; entries already being extracted
    /// run to completion.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// List the archive and extract every entry beneath `destination_dir`.
    ///
    /// Listing errors are returned before anything is dispatched. Once
    /// extraction starts, a failing entry never stops the others; failures
    /// are gathered into [`Error::PartialExtraction`] after all tasks finish.
    pub async fn extract_to(&self, destination_dir: &Path) -> Result<ExtractionReport> {
        let entries = self.archive.list_entries().await?;
        let total = entries.len();
        let mut report = ExtractionReport::empty(total, destination_dir);

        info!(
            archive = %self.archive.path().display(),
            destination = %destination_dir.display(),
            entries = total,
            workers = self.workers,
            "starting extraction"
        );

        if total == 0 {
            return Ok(report);
        }

        fs::create_dir_all(destination_dir).await?;

        let counter = Arc::new(ProgressCounter::new(total, self.progress.clone()));
        let archive = self.archive.clone();
        let destination = destination_dir.to_path_buf();
        let (outcomes, cancelled) = self
            .dispatch(entries, &counter, move |entry| {
                let archive = archive.clone();
                let destination = destination.clone();
                async move { archive.extract_entry(&entry, &destination).await }
            })
            .await;

        let mut failures = Vec::new();
        for (entry, result) in outcomes {
            match result {
                Ok(_) if entry.is_directory => report.directories_created += 1,
                Ok(_) => {
                    report.files_extracted += 1;
                    report.bytes_written += entry.uncompressed_size;
                }
                Err(error) => {
                    warn!(entry = %entry.name, %error, "failed to extract entry");
                    failures.push((
                        entry.index,
                        EntryFailure {
                            name: entry.name,
                            error,
                        },
                    ));
                }
            }
        }

        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<_> = failures.into_iter().map(|(_, f)| f).collect();

        if cancelled {
            warn!(
                completed = counter.completed(),
                total, "extraction cancelled"
            );
            return Err(Error::Cancelled {
                completed: counter.completed(),
                total,
                failures,
            });
        }

        if !failures.is_empty() {
            return Err(Error::PartialExtraction { failures, total });
        }

        debug!(
            files = report.files_extracted,
            directories = report.directories_created,
            "all entries extracted"
        );
        info!(
            entries = total,
            bytes = report.bytes_written,
            "extraction complete"
        );
        Ok(report)
    }

    /// Run `extract` for each entry with at most `workers` in flight and
    /// wait for every dispatched task.
    ///
    /// Returns one outcome per dispatched entry, in completion order, and
    /// whether cancellation cut dispatch short.
    async fn dispatch<F, Fut>(
        &self,
        entries: Vec<EntryDescriptor>,
        counter: &Arc<ProgressCounter>,
        extract: F,
    ) -> (Vec<(EntryDescriptor, Result<PathBuf>)>, bool)
    where
        F: Fn(EntryDescriptor) -> Fut,
        Fut: Future<Output = Result<PathBuf>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::new();
        let mut cancelled = false;

        for entry in entries {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => permit,
            };
            // The semaphore is never closed
            let Ok(permit) = permit else { break };

            let job = extract(entry.clone());
            let counter = counter.clone();
            let counted = Arc::new(AtomicBool::new(false));
            let name = entry.name.clone();
            let task_counted = counted.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                let result = job.await;
                task_counted.store(true, Ordering::SeqCst);
                counter.complete(&name, result.is_ok());
                result
            });
            in_flight.insert(handle.id(), (entry, counted));
        }

        let mut outcomes = Vec::with_capacity(in_flight.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    if let Some((entry, _)) = in_flight.remove(&id) {
                        outcomes.push((entry, result));
                    }
                }
                Err(join_error) => {
                    let Some((entry, counted)) = in_flight.remove(&join_error.id()) else {
                        continue;
                    };
                    warn!(entry = %entry.name, error = %join_error, "extraction task aborted");
                    // Only reachable when panics unwind. A panicking sink has
                    // already counted its entry.
                    if !counted.load(Ordering::SeqCst) {
                        counter.complete(&entry.name, false);
                    }
                    let error = Error::Io(std::io::Error::other(join_error.to_string()));
                    outcomes.push((entry, Err(error)));
                }
            }
        }

        (outcomes, cancelled)
    }
}

/// Extract every entry of `archive_path` into `destination_dir` with up to
/// `worker_count` entries in flight and no progress reporting.
pub async fn extract_all(
    archive_path: &Path,
    destination_dir: &Path,
    worker_count: usize,
) -> Result<ExtractionReport> {
    ParallelExtractor::new(archive_path)
        .workers(worker_count)
        .extract_to(destination_dir)
        .await
}
