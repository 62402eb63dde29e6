//! Units of work accepted by the pool.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::error::{AppResult, TaskFailure};
use crate::util::panic_message;

type TaskBody = Box<dyn FnOnce() -> AppResult<()> + Send + 'static>;

/// A fire-and-forget unit of work.
///
/// The caller never observes the outcome; failures are routed to the pool's
/// failure handler.
pub struct Task {
    body: TaskBody,
}

impl Task {
    /// Wrap an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            body: Box::new(move || {
                f();
                Ok(())
            }),
        }
    }

    /// Wrap a closure whose error is reported as a [`TaskFailure::Errored`].
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        Self { body: Box::new(f) }
    }

    /// Run the task, containing any panic.
    pub(crate) fn run(self) -> Result<(), TaskFailure> {
        match panic::catch_unwind(AssertUnwindSafe(self.body)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(TaskFailure::Errored(error)),
            Err(payload) => Err(TaskFailure::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
