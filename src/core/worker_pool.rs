//! Bounded worker pool with caller-runs backpressure.
//!
//! The pool owns a set of named OS threads and one bounded FIFO queue. Each
//! submission is admitted in this order:
//!
//! 1. below `core_size` workers: a new worker is spawned with the task;
//! 2. queue has room: the task is enqueued;
//! 3. below `max_size` workers: a new worker is spawned with the task;
//! 4. otherwise the task runs on the submitting thread.
//!
//! The last step is the backpressure mechanism: a saturated pool slows the
//! producer down instead of buffering without bound or dropping work.
//!
//! # Example
//!
//! ```rust,ignore
//! use event_worker_pool::builders::WorkerPoolBuilder;
//!
//! let pool = WorkerPoolBuilder::new()
//!     .thread_name_prefix("canal-execute-thread")
//!     .build()?;
//!
//! pool.execute(move || handle_row_change(entry))?;
//!
//! pool.shutdown_and_wait(Duration::from_secs(30))?;
//! ```

mod threads;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub use threads::{WorkerPool, DEFAULT_THREAD_PREFIX};

pub(crate) use threads::ThreadOptions;

/// Pool lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Constructed; no worker spawned yet.
    Unstarted,
    /// Accepting submissions.
    Running,
    /// Rejecting submissions while workers drain the queue.
    ShuttingDown,
    /// All workers have exited. Terminal.
    Terminated,
}

impl PoolState {
    /// Whether submissions are still accepted.
    #[must_use]
    pub const fn accepts_tasks(self) -> bool {
        matches!(self, Self::Unstarted | Self::Running)
    }
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    /// Lifecycle state at snapshot time.
    pub state: PoolState,

    /// Number of live worker threads.
    pub worker_count: usize,

    /// Highest worker count ever reached.
    pub largest_worker_count: usize,

    /// Tasks currently executing (including caller-run tasks).
    pub active_tasks: u64,

    /// Tasks waiting in the queue.
    pub queued_tasks: usize,

    /// Total tasks accepted by `submit`.
    pub submitted_tasks: u64,

    /// Total tasks that finished without failure.
    pub completed_tasks: u64,

    /// Total tasks that panicked or returned an error.
    pub failed_tasks: u64,

    /// Total tasks run on the submitting thread because the pool was saturated.
    pub caller_runs: u64,

    /// Total submissions rejected after shutdown.
    pub rejected_tasks: u64,

    /// Total surplus workers retired after their keepalive elapsed.
    pub retired_workers: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_tasks: AtomicU64,
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub failed_tasks: AtomicU64,
    pub caller_runs: AtomicU64,
    pub rejected_tasks: AtomicU64,
    pub retired_workers: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(
        &self,
        state: PoolState,
        worker_count: usize,
        largest_worker_count: usize,
        queued_tasks: usize,
    ) -> PoolStats {
        PoolStats {
            state,
            worker_count,
            largest_worker_count,
            active_tasks: self.active_tasks.load(Ordering::Relaxed),
            queued_tasks,
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            caller_runs: self.caller_runs.load(Ordering::Relaxed),
            rejected_tasks: self.rejected_tasks.load(Ordering::Relaxed),
            retired_workers: self.retired_workers.load(Ordering::Relaxed),
        }
    }
}
