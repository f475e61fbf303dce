//! Completion accounting shared by all extraction tasks.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One observation emitted as an entry finishes.
///
/// Events arrive in completion order, which is unrelated to archive order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Entries finished so far, including this one
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    /// Name of the entry that just finished
    pub entry: String,
    pub succeeded: bool,
}

/// Receives progress events.
///
/// Called while the counter's lock is held, so implementations see events
/// one at a time and in `completed` order. Keep them quick.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Renders `Extracted: i/total (p%)` in place on stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    started: AtomicBool,
}

impl ConsoleProgress {
    /// Terminate the in-place line once the run is over.
    ///
    /// Does nothing if no event was ever rendered.
    pub fn finish(&self) {
        if !self.started.swap(false, Ordering::Relaxed) {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout);
        let _ = stdout.flush();
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        self.started.store(true, Ordering::Relaxed);
        let mut stdout = std::io::stdout().lock();
        let _ = write!(
            stdout,
            "\rExtracted: {}/{} ({:.2}%)",
            event.completed, event.total, event.percent
        );
        let _ = stdout.flush();
    }
}

/// Count of finished entries out of a total fixed at listing time.
///
/// `completed` only ever moves up by one per finished task and never
/// exceeds `total`.
pub struct ProgressCounter {
    completed: Mutex<usize>,
    total: usize,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressCounter {
    pub fn new(total: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            completed: Mutex::new(0),
            total,
            sink,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        *self.completed.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one finished entry and notify the sink.
    ///
    /// Increment, percentage and emission happen under a single lock so
    /// concurrent callers can neither lose updates nor interleave output.
    pub fn complete(&self, entry: &str, succeeded: bool) -> ProgressEvent {
        let mut completed = self.completed.lock().unwrap_or_else(|e| e.into_inner());
        debug_assert!(*completed < self.total, "more completions than entries");
        *completed = (*completed + 1).min(self.total);

        let event = ProgressEvent {
            completed: *completed,
            total: self.total,
            percent: percent(*completed, self.total),
            entry: entry.to_string(),
            succeeded,
        };
        self.sink.on_progress(&event);
        event
    }
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    completed as f64 / total as f64 * 100.0
}
