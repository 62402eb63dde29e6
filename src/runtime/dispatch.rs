//! Dispatch surface handed to event producers.
//!
//! Producers hold a [`Dispatcher`] rather than a [`WorkerPool`] so that a
//! disabled pool degrades to synchronous execution without changing call
//! sites.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::warn;

use crate::core::{report_failure, AppResult, FailureHandler, PoolError, Task, WorkerPool};

/// Where submitted tasks run.
pub enum Dispatcher {
    /// Tasks run on a bounded worker pool.
    Pooled(WorkerPool),
    /// Tasks run on the submitting thread.
    Inline {
        /// Receives failures of inline tasks.
        failure_handler: Arc<dyn FailureHandler>,
        /// Set once [`Dispatcher::shutdown`] has been called.
        shut_down: AtomicBool,
    },
}

impl Dispatcher {
    /// Create an inline dispatcher.
    #[must_use]
    pub fn inline(failure_handler: Arc<dyn FailureHandler>) -> Self {
        Self::Inline {
            failure_handler,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Dispatch a task.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` after shutdown.
    pub fn dispatch(&self, task: Task) -> Result<(), PoolError> {
        match self {
            Self::Pooled(pool) => pool.submit(task),
            Self::Inline {
                failure_handler,
                shut_down,
            } => {
                if shut_down.load(Ordering::Acquire) {
                    warn!("task dispatched after shutdown; rejecting");
                    return Err(PoolError::Rejected);
                }
                if let Err(failure) = task.run() {
                    let current = thread::current();
                    let thread_name = current.name().unwrap_or("<unnamed>");
                    report_failure(failure_handler.as_ref(), thread_name, &failure);
                }
                Ok(())
            }
        }
    }

    /// Dispatch an infallible closure.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` after shutdown.
    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatch(Task::new(f))
    }

    /// Dispatch a fallible closure.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` after shutdown.
    pub fn execute_fallible<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        self.dispatch(Task::fallible(f))
    }

    /// Stop accepting tasks. Pooled dispatchers drain gracefully.
    pub fn shutdown(&self) {
        match self {
            Self::Pooled(pool) => pool.shutdown(),
            Self::Inline { shut_down, .. } => shut_down.store(true, Ordering::Release),
        }
    }

    /// The underlying pool, if tasks are pooled.
    #[must_use]
    pub const fn pool(&self) -> Option<&WorkerPool> {
        match self {
            Self::Pooled(pool) => Some(pool),
            Self::Inline { .. } => None,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled(pool) => f.debug_tuple("Pooled").field(pool).finish(),
            Self::Inline { shut_down, .. } => f
                .debug_struct("Inline")
                .field("shut_down", &shut_down.load(Ordering::Relaxed))
                .finish_non_exhaustive(),
        }
    }
}
