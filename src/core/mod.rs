//! Core pool abstractions: tasks, failure isolation, and the worker pool.

pub mod error;
pub mod failure;
pub mod task;
pub mod worker_pool;

pub use error::{AppResult, PoolError, TaskFailure};
pub use failure::{FailureHandler, LogFailureHandler};
pub use task::Task;
pub use worker_pool::{PoolState, PoolStats, WorkerPool};

pub(crate) use failure::report_failure;
