//! Error types for pool operations and task failures.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers of a `WorkerPool`.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool is shutting down or terminated and no longer accepts work.
    #[error("pool has been shut down; task rejected")]
    Rejected,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker thread could not be created.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    /// Workers did not finish draining within the allotted time.
    #[error("pool did not terminate within {timeout:?}; {remaining_workers} worker(s) still running")]
    ShutdownTimeout {
        /// How long the caller waited.
        timeout: Duration,
        /// Workers still alive when the wait gave up.
        remaining_workers: usize,
    },
    /// Internal error (join failure in the async bridge, etc.).
    #[error("internal error: {0}")]
    Internal(String),
}

/// An uncaught failure raised while running a task.
///
/// Never returned to the submitter; only handed to the pool's
/// [`FailureHandler`](crate::core::FailureHandler).
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The task panicked.
    #[error("task panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
    /// The task returned an error.
    #[error("task failed: {0:#}")]
    Errored(anyhow::Error),
}

/// Application-facing result using anyhow for fallible task bodies.
pub type AppResult<T> = Result<T, anyhow::Error>;
