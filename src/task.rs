// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Background work: the worker pool, cancellation and completion handles.
//!
//! Writing an index and running a query both happen off the caller's thread,
//! on a small fixed pool shared by the whole process. The caller gets a
//! [`Pending`] back immediately and blocks only when it asks for the result.
//!
//! Cancellation is cooperative. Long operations poll a [`Cancellable`] at a
//! few phase boundaries and, if it has tripped, stop and report
//! [`Completion::Cancelled`]. No partial result is ever delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, OnceLock};
use std::thread;

use crate::error::{Error, Result};

/// Environment variable that overrides the worker count.
pub const WORKER_THREADS_ENV: &str = "FZINDEX_WORKER_THREADS";

// ============================================================================
// COMPLETION
// ============================================================================

/// Outcome of an operation that may be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Completion<T> {
    Done(T),
    Cancelled,
}

impl<T> Completion<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled)
    }

    /// The result, or `None` if the operation was cancelled.
    pub fn done(self) -> Option<T> {
        match self {
            Completion::Done(value) => Some(value),
            Completion::Cancelled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completion<U> {
        match self {
            Completion::Done(value) => Completion::Done(f(value)),
            Completion::Cancelled => Completion::Cancelled,
        }
    }
}

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellable {
    flag: Arc<AtomicBool>,
}

impl Cancellable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Poll at a phase boundary. Returns true if work should stop.
    pub(crate) fn tripped(&self, phase: &'static str) -> bool {
        let cancelled = self.is_cancelled();
        tracing::trace!(phase, cancelled, "cancellation check");
        cancelled
    }
}

// ============================================================================
// PENDING RESULTS
// ============================================================================

/// A result that a worker will deliver later.
#[derive(Debug)]
#[must_use = "a Pending does nothing unless waited on"]
pub struct Pending<T> {
    rx: Receiver<Result<Completion<T>>>,
}

impl<T> Pending<T> {
    /// An already available result.
    pub(crate) fn ready(result: Result<Completion<T>>) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        // The receiver is alive, so the send cannot fail.
        let _ = tx.send(result);
        Self { rx }
    }

    /// Block until the worker reports.
    pub fn wait(self) -> Result<Completion<T>> {
        self.rx.recv().map_err(|_| Error::WorkerLost)?
    }

    /// The result if it has arrived, without blocking.
    pub fn try_take(&self) -> Option<Result<Completion<T>>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::WorkerLost)),
        }
    }
}

// ============================================================================
// WORKER POOL
// ============================================================================

/// Process-wide pool that runs writes and queries.
///
/// Lazily started on first use with a fixed number of named threads. If the
/// threads cannot be started, jobs fall back to rayon's global pool.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
    threads: usize,
}

impl WorkerPool {
    /// The shared pool.
    pub fn get() -> &'static WorkerPool {
        static POOL: OnceLock<WorkerPool> = OnceLock::new();
        POOL.get_or_init(WorkerPool::start)
    }

    fn start() -> WorkerPool {
        let threads = worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fzindex-worker-{i}"))
            .panic_handler(|_| tracing::error!("fzindex worker job panicked"))
            .build();

        match pool {
            Ok(pool) => {
                tracing::debug!(threads, "started worker pool");
                WorkerPool {
                    pool: Some(pool),
                    threads,
                }
            }
            Err(err) => {
                tracing::warn!(%err, "could not start worker pool, using the global rayon pool");
                WorkerPool {
                    pool: None,
                    threads: rayon::current_num_threads(),
                }
            }
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn spawn<F: FnOnce() + Send + 'static>(&self, job: F) {
        match &self.pool {
            Some(pool) => pool.spawn_fifo(job),
            None => rayon::spawn_fifo(job),
        }
    }

    /// True on one of the pool's own threads.
    fn on_worker(&self) -> bool {
        match &self.pool {
            Some(pool) => pool.current_thread_index().is_some(),
            None => rayon::current_thread_index().is_some(),
        }
    }

    /// Run `job` on the pool; the result arrives through the returned handle.
    ///
    /// Called from a pool thread (a `run_with` callback, say), the job runs in
    /// place and the handle is ready on return.
    pub fn run<T, F>(&self, job: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<Completion<T>> + Send + 'static,
    {
        if self.on_worker() {
            // A job queued behind the waiting worker could never start.
            return Pending::ready(job());
        }
        let (tx, rx) = mpsc::sync_channel(1);
        self.spawn(move || {
            // A dropped Pending means nobody wants the result.
            let _ = tx.send(job());
        });
        Pending { rx }
    }

    /// Run `job` on the pool and hand its result to `callback`.
    ///
    /// The callback runs on the worker thread that ran the job. Blocking
    /// calls made from it run in place rather than queueing behind it.
    pub fn run_with<T, F, C>(&self, job: F, callback: C)
    where
        T: Send + 'static,
        F: FnOnce() -> Result<Completion<T>> + Send + 'static,
        C: FnOnce(Result<Completion<T>>) + Send + 'static,
    {
        self.spawn(move || callback(job()));
    }
}

/// Worker count: `FZINDEX_WORKER_THREADS` if set to a positive number,
/// otherwise the machine's available parallelism.
fn worker_threads() -> usize {
    std::env::var(WORKER_THREADS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}
