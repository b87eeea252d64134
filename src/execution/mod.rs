//! Parallel per-file execution.
//!
//! Files are independent, so each one is a unit of work on a dedicated rayon pool:
//!
//! - results come back in input order, merged only by the caller
//! - `max_in_flight_files` bounds how many files are being processed (held in memory) at once
//! - real-time metrics + observer hooks for monitoring

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{PoolError, PoolResult};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on files processed concurrently.
    pub max_in_flight_files: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            max_in_flight_files: n,
        }
    }
}

/// Runs independent per-file jobs on a bounded worker pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine.
    ///
    /// Fails with [`PoolError::InvalidConfig`] if `max_in_flight_files == 0` or
    /// `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> PoolResult<Self> {
        if opts.max_in_flight_files == 0 {
            return Err(PoolError::InvalidConfig {
                message: "max_in_flight_files must be > 0".to_string(),
            });
        }
        if opts.num_threads == Some(0) {
            return Err(PoolError::InvalidConfig {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .thread_name(|i| format!("pool-report-{i}"))
            .build()
            .map_err(|e| PoolError::InvalidConfig {
                message: format!("failed to build worker pool: {e}"),
            })?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `job` over every item in parallel. Output order matches `items`.
    ///
    /// `label` names an item for events. A job's `Err` is counted as a failed file but does not
    /// stop the others.
    pub fn run<T, R, E, L, F>(&self, items: &[T], label: L, job: F) -> Vec<Result<R, E>>
    where
        T: Sync,
        R: Send,
        E: Send,
        L: Fn(&T) -> String + Send + Sync,
        F: Fn(&T) -> Result<R, E> + Send + Sync,
    {
        self.pool.install(|| self.run_impl(items, &label, &job))
    }

    fn run_impl<T, R, E>(
        &self,
        items: &[T],
        label: &(dyn Fn(&T) -> String + Send + Sync),
        job: &(dyn Fn(&T) -> Result<R, E> + Send + Sync),
    ) -> Vec<Result<R, E>>
    where
        T: Sync,
        R: Send,
        E: Send,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted { files: items.len() });

        let sem = Semaphore::new(self.opts.max_in_flight_files);

        let out: Vec<Result<R, E>> = items
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                let permit = sem.acquire();
                if permit.waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(permit.waited);
                    self.emit(ExecutionEvent::ThrottleWaited {
                        index,
                        duration: permit.waited,
                    });
                }

                let name = label(item);
                let file_start = Instant::now();
                self.metrics.on_file_start();
                self.emit(ExecutionEvent::FileStarted {
                    index,
                    label: name.clone(),
                });

                let result = job(item);

                let succeeded = result.is_ok();
                self.metrics.on_file_end(succeeded);
                self.emit(ExecutionEvent::FileFinished {
                    index,
                    label: name,
                    succeeded,
                    elapsed: file_start.elapsed(),
                });
                drop(permit);
                result
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
