//! Builders to construct worker pools from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{ExecutorConfig, PoolSizing};
use crate::core::worker_pool::ThreadOptions;
use crate::core::{FailureHandler, LogFailureHandler, PoolError, WorkerPool};
use crate::runtime::Dispatcher;

/// [`WorkerPoolBuilder`] configures and builds a [`WorkerPool`].
///
/// Starts from the sizing detected for this machine and the
/// [`LogFailureHandler`]; every setting can be overridden.
pub struct WorkerPoolBuilder {
    sizing: PoolSizing,
    thread_options: ThreadOptions,
    failure_handler: Arc<dyn FailureHandler>,
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPoolBuilder {
    /// Initializes a builder with detected sizing and default thread settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sizing: PoolSizing::detect(),
            thread_options: ThreadOptions::default(),
            failure_handler: Arc::new(LogFailureHandler),
        }
    }

    /// Initializes a builder from configuration overrides.
    ///
    /// The `enabled` flag is not consulted here; see [`build_dispatcher`].
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the overrides do not resolve to a
    /// valid sizing.
    pub fn from_config(cfg: &ExecutorConfig) -> Result<Self, PoolError> {
        let sizing = cfg
            .resolve(num_cpus::get())
            .map_err(PoolError::InvalidConfig)?;

        let mut builder = Self::new().sizing(sizing);
        if let Some(prefix) = &cfg.thread_name_prefix {
            builder = builder.thread_name_prefix(prefix.clone());
        }
        Ok(builder)
    }

    /// Replaces the whole sizing.
    #[must_use]
    pub fn sizing(mut self, sizing: PoolSizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Sets the resident worker count.
    #[must_use]
    pub fn core_size(mut self, core_size: usize) -> Self {
        self.sizing.core_size = core_size;
        self
    }

    /// Sets the worker ceiling.
    #[must_use]
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.sizing.max_size = max_size;
        self
    }

    /// Sets the pending-task bound.
    #[must_use]
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.sizing.queue_capacity = queue_capacity;
        self
    }

    /// Sets how long a surplus worker may idle before it retires.
    #[must_use]
    pub fn keepalive(mut self, keepalive: Duration) -> Self {
        self.sizing.keepalive = keepalive;
        self
    }

    /// Sets the worker thread name prefix; workers are named `<prefix>-N`.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_options.name_prefix = prefix.into();
        self
    }

    /// Sets the stack size, in bytes, of every worker thread.
    #[must_use]
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.thread_options.stack_size = Some(stack_size);
        self
    }

    /// Sets the handler invoked for uncaught task failures.
    #[must_use]
    pub fn failure_handler<H>(mut self, handler: H) -> Self
    where
        H: FailureHandler,
    {
        self.failure_handler = Arc::new(handler);
        self
    }

    /// The sizing the pool will be built with.
    #[must_use]
    pub const fn current_sizing(&self) -> &PoolSizing {
        &self.sizing
    }

    /// Constructs the [`WorkerPool`].
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the sizing or thread settings are
    /// invalid.
    pub fn build(self) -> Result<WorkerPool, PoolError> {
        WorkerPool::with_thread_options(self.sizing, self.failure_handler, self.thread_options)
    }
}

/// Build the dispatcher selected by `cfg.enabled`.
///
/// A disabled configuration yields [`Dispatcher::Inline`], which runs every
/// task on the submitting thread with the same failure isolation.
///
/// # Errors
///
/// Returns `PoolError::InvalidConfig` if an enabled configuration is invalid.
pub fn build_dispatcher<H>(cfg: &ExecutorConfig, failure_handler: H) -> Result<Dispatcher, PoolError>
where
    H: FailureHandler,
{
    if !cfg.enabled {
        info!("worker pool disabled; tasks will run on the submitting thread");
        return Ok(Dispatcher::inline(Arc::new(failure_handler)));
    }

    let pool = WorkerPoolBuilder::from_config(cfg)?
        .failure_handler(failure_handler)
        .build()?;
    Ok(Dispatcher::Pooled(pool))
}
