use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info};

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { files: usize },
    ThrottleWaited { index: usize, duration: Duration },
    FileStarted { index: usize, label: String },
    FileFinished { index: usize, label: String, succeeded: bool, elapsed: Duration },
    RunFinished { elapsed: Duration, metrics: ExecutionMetricsSnapshot },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted { files } => info!(files, "execution started"),
            ExecutionEvent::ThrottleWaited { index, duration } => {
                debug!(index, waited = ?duration, "waited for a file slot")
            }
            ExecutionEvent::FileStarted { index, label } => debug!(index, file = %label, "file started"),
            ExecutionEvent::FileFinished {
                index,
                label,
                succeeded,
                elapsed,
            } => debug!(index, file = %label, succeeded, elapsed = ?elapsed, "file finished"),
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                info!(elapsed = ?elapsed, %metrics, "execution finished")
            }
        }
    }
}

/// Real-time counters for an execution run.
///
/// The engine updates these while files are processed; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    files_started: AtomicU64,
    files_finished: AtomicU64,
    files_failed: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_files: AtomicUsize,
    max_active_files: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            files_started: AtomicU64::new(0),
            files_finished: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            throttle_wait_ns: AtomicU64::new(0),
            active_files: AtomicUsize::new(0),
            max_active_files: AtomicUsize::new(0),
        }
    }

    pub fn begin_run(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.files_started.store(0, Ordering::SeqCst);
        self.files_finished.store(0, Ordering::SeqCst);
        self.files_failed.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_files.store(0, Ordering::SeqCst);
        self.max_active_files.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub fn on_file_start(&self) {
        self.files_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_files.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_files.fetch_max(now, Ordering::SeqCst);
    }

    pub fn on_file_end(&self, succeeded: bool) {
        self.files_finished.fetch_add(1, Ordering::SeqCst);
        if !succeeded {
            self.files_failed.fetch_add(1, Ordering::SeqCst);
        }
        self.active_files.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn on_throttle_wait(&self, d: Duration) {
        self.throttle_wait_ns.fetch_add(saturating_nanos(d), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            files_started: self.files_started.load(Ordering::SeqCst),
            files_finished: self.files_finished.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_files: self.max_active_files.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub files_started: u64,
    pub files_finished: u64,
    pub files_failed: u64,
    pub throttle_wait: Duration,
    pub max_active_files: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, files={}/{}, failed={}, max_active_files={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.files_finished,
            self.files_started,
            self.files_failed,
            self.max_active_files,
            self.throttle_wait,
            self.elapsed
        )
    }
}
