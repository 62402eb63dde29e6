//! Tokio adapters for calling the pool from async code.
//!
//! Submission can run a task on the caller when the pool is saturated, and
//! waiting for termination blocks on a Condvar. Both are moved onto tokio's
//! blocking thread pool so they never stall an async worker thread.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{PoolError, Task, WorkerPool};

/// Submit a task from async code.
///
/// # Errors
///
/// - `PoolError::Rejected` once shutdown has begun
/// - `PoolError::Internal` if the blocking submission could not be joined
pub async fn submit_async(pool: Arc<WorkerPool>, task: Task) -> Result<(), PoolError> {
    tokio::task::spawn_blocking(move || pool.submit(task))
        .await
        .map_err(|e| PoolError::Internal(format!("submission task failed: {e}")))?
}

/// Wait for the pool to terminate from async code.
///
/// # Errors
///
/// - `PoolError::ShutdownTimeout` if workers are still draining after `timeout`
/// - `PoolError::Internal` if the blocking wait could not be joined
pub async fn await_termination_async(
    pool: Arc<WorkerPool>,
    timeout: Duration,
) -> Result<(), PoolError> {
    tokio::task::spawn_blocking(move || pool.await_termination(timeout))
        .await
        .map_err(|e| PoolError::Internal(format!("termination wait failed: {e}")))?
}
