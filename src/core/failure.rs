//! Observation hook for uncaught task failures.

use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use super::error::TaskFailure;
use crate::util::panic_message;

/// Receives uncaught task failures.
///
/// Implementations are strictly for observability. They run on the thread that
/// executed the failing task, after the task has unwound, and must not try to
/// retry or resubmit the work. Closures of the form `Fn(&str, &TaskFailure)`
/// implement this trait.
///
/// ```rust,ignore
/// let handler = |thread: &str, failure: &TaskFailure| {
///     tracing::warn!(thread, error = %failure, "event handler failed");
/// };
/// ```
pub trait FailureHandler: Send + Sync + 'static {
    /// Called once per failed task with the executing thread's name.
    fn on_uncaught_failure(&self, thread_name: &str, failure: &TaskFailure);
}

impl<F> FailureHandler for F
where
    F: Fn(&str, &TaskFailure) + Send + Sync + 'static,
{
    fn on_uncaught_failure(&self, thread_name: &str, failure: &TaskFailure) {
        self(thread_name, failure);
    }
}

/// Default handler: logs the failure at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailureHandler;

impl FailureHandler for LogFailureHandler {
    fn on_uncaught_failure(&self, thread_name: &str, failure: &TaskFailure) {
        error!(thread = thread_name, error = %failure, "uncaught failure in pooled task");
    }
}

/// Hand `failure` to `handler`, containing a panicking handler.
pub(crate) fn report_failure(handler: &dyn FailureHandler, thread_name: &str, failure: &TaskFailure) {
    let reported = panic::catch_unwind(AssertUnwindSafe(|| {
        handler.on_uncaught_failure(thread_name, failure);
    }));

    if let Err(payload) = reported {
        error!(
            thread = thread_name,
            error = %failure,
            handler_panic = %panic_message(payload.as_ref()),
            "failure handler panicked"
        );
    }
}
