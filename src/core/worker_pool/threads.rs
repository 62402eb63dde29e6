//! `WorkerPool` implementation using dedicated OS threads.
//!
//! # Design Principles
//!
//! - **No polling**: workers block on the shared channel; termination is
//!   signalled through a Condvar
//! - **Single admission lock**: spawn decisions and enqueue attempts happen
//!   under the lifecycle mutex, so the worker count never exceeds `max_size`
//!   and no task slips into the queue after shutdown
//! - **Lazy queue storage**: the channel is unbounded and `queue_capacity`
//!   is enforced under the admission lock, so queue memory tracks the tasks
//!   actually waiting rather than the configured bound
//! - **Clean shutdown**: dropping the only sender lets workers drain the queue
//!   and then observe the disconnect

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::PoolSizing;
use crate::core::error::{AppResult, PoolError};
use crate::core::failure::{report_failure, FailureHandler};
use crate::core::task::Task;

use super::{PoolCounters, PoolState, PoolStats};

/// Worker thread name prefix used when none is configured.
pub const DEFAULT_THREAD_PREFIX: &str = "pool-thread";

/// Thread settings applied to every worker.
#[derive(Debug, Clone)]
pub(crate) struct ThreadOptions {
    pub name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_THREAD_PREFIX.to_owned(),
            stack_size: None,
        }
    }
}

/// State guarded by the admission lock.
struct Lifecycle {
    state: PoolState,
    workers: usize,
    largest_workers: usize,
    /// Only sender of the task queue. `None` once shutdown has begun.
    sender: Option<Sender<Task>>,
}

/// A worker that could not be spawned, with the task it was meant to run.
struct SpawnFailure {
    error: io::Error,
    task: Option<Task>,
}

/// Pool state shared by the owner and the worker threads.
struct Shared {
    sizing: PoolSizing,
    thread_options: ThreadOptions,
    lifecycle: Mutex<Lifecycle>,
    terminated: Condvar,
    receiver: Receiver<Task>,
    counters: PoolCounters,
    failure_handler: Arc<dyn FailureHandler>,
    next_thread_id: AtomicUsize,
}

/// Bounded worker pool with dedicated OS threads.
///
/// Workers are spawned lazily, up to `core_size` on demand and up to
/// `max_size` once the queue is full. Workers above `core_size` retire after
/// `keepalive` without work. When both the queue and the worker set are full,
/// `submit` runs the task on the calling thread.
///
/// Call [`shutdown`](Self::shutdown) during orderly teardown. Dropping the pool
/// signals the same graceful shutdown but does not wait for the drain.
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Create a pool with the given sizing and failure handler.
    ///
    /// No thread is spawned until the first submission or [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the sizing is invalid.
    pub fn new(
        sizing: PoolSizing,
        failure_handler: Arc<dyn FailureHandler>,
    ) -> Result<Self, PoolError> {
        Self::with_thread_options(sizing, failure_handler, ThreadOptions::default())
    }

    pub(crate) fn with_thread_options(
        sizing: PoolSizing,
        failure_handler: Arc<dyn FailureHandler>,
        thread_options: ThreadOptions,
    ) -> Result<Self, PoolError> {
        sizing.validate().map_err(PoolError::InvalidConfig)?;
        if thread_options.name_prefix.contains('\0') {
            return Err(PoolError::InvalidConfig(
                "thread_name_prefix must not contain null bytes".into(),
            ));
        }

        let (sender, receiver) = unbounded();

        info!(
            core_size = sizing.core_size,
            max_size = sizing.max_size,
            queue_capacity = sizing.queue_capacity,
            keepalive_secs = sizing.keepalive.as_secs_f64(),
            thread_prefix = %thread_options.name_prefix,
            "WorkerPool initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                sizing,
                thread_options,
                lifecycle: Mutex::new(Lifecycle {
                    state: PoolState::Unstarted,
                    workers: 0,
                    largest_workers: 0,
                    sender: Some(sender),
                }),
                terminated: Condvar::new(),
                receiver,
                counters: PoolCounters::default(),
                failure_handler,
                next_thread_id: AtomicUsize::new(0),
            }),
        })
    }

    /// Submit a task for asynchronous execution.
    ///
    /// Returns once the task has been handed to a worker, queued, or, when the
    /// pool is saturated, executed on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` once shutdown has begun.
    pub fn submit(&self, task: Task) -> Result<(), PoolError> {
        let shared = &self.shared;
        let mut lifecycle = shared.lifecycle.lock();

        let state = lifecycle.state;
        match state {
            PoolState::Unstarted => {
                lifecycle.state = PoolState::Running;
                debug!("worker pool started by first submission");
            }
            PoolState::Running => {}
            PoolState::ShuttingDown | PoolState::Terminated => {
                drop(lifecycle);
                shared.counters.rejected_tasks.fetch_add(1, Ordering::Relaxed);
                warn!("task submitted after shutdown; rejecting");
                return Err(PoolError::Rejected);
            }
        }

        shared.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);

        let Some(task) = shared.admit(&mut lifecycle, task) else {
            return Ok(());
        };
        drop(lifecycle);

        shared.counters.caller_runs.fetch_add(1, Ordering::Relaxed);
        let current = thread::current();
        let thread_name = current.name().unwrap_or("<unnamed>");
        debug!(thread = thread_name, "pool saturated; running task on submitting thread");
        shared.run_task(thread_name, task);

        Ok(())
    }

    /// Submit an infallible closure.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` once shutdown has begun.
    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Task::new(f))
    }

    /// Submit a closure whose error is reported to the failure handler.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Rejected` once shutdown has begun.
    pub fn execute_fallible<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        self.submit(Task::fallible(f))
    }

    /// Start the pool and spawn any missing core workers.
    ///
    /// Returns the number of workers started.
    ///
    /// # Errors
    ///
    /// - `PoolError::Rejected` if shutdown has begun
    /// - `PoolError::Spawn` if a worker thread could not be created
    pub fn start(&self) -> Result<usize, PoolError> {
        let mut lifecycle = self.shared.lifecycle.lock();
        if !lifecycle.state.accepts_tasks() {
            return Err(PoolError::Rejected);
        }
        lifecycle.state = PoolState::Running;

        let mut started = 0;
        while lifecycle.workers < self.shared.sizing.core_size {
            self.shared
                .add_worker(&mut lifecycle, None)
                .map_err(|failure| PoolError::Spawn(failure.error))?;
            started += 1;
        }

        info!(started, worker_count = lifecycle.workers, "worker pool started");
        Ok(started)
    }

    /// Stop accepting tasks and let workers drain the queue.
    ///
    /// Returns immediately; use [`await_termination`](Self::await_termination)
    /// to wait for the drain. Calling this more than once is a no-op.
    pub fn shutdown(&self) {
        let mut lifecycle = self.shared.lifecycle.lock();
        if !lifecycle.state.accepts_tasks() {
            return;
        }

        lifecycle.sender = None;

        if lifecycle.workers == 0 {
            lifecycle.state = PoolState::Terminated;
            self.shared.terminated.notify_all();
            info!("worker pool terminated");
        } else {
            lifecycle.state = PoolState::ShuttingDown;
            info!(
                worker_count = lifecycle.workers,
                queued_tasks = self.shared.receiver.len(),
                "shutting down worker pool"
            );
        }
    }

    /// Block until every worker has exited.
    ///
    /// Must not be called from a task running on this pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ShutdownTimeout` if workers are still running when
    /// `timeout` elapses. The pool keeps draining regardless.
    pub fn await_termination(&self, timeout: Duration) -> Result<(), PoolError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut lifecycle = self.shared.lifecycle.lock();

        while lifecycle.state != PoolState::Terminated {
            match deadline {
                Some(deadline) => {
                    let timed_out = self
                        .shared
                        .terminated
                        .wait_until(&mut lifecycle, deadline)
                        .timed_out();
                    if timed_out && lifecycle.state != PoolState::Terminated {
                        return Err(PoolError::ShutdownTimeout {
                            timeout,
                            remaining_workers: lifecycle.workers,
                        });
                    }
                }
                None => self.shared.terminated.wait(&mut lifecycle),
            }
        }

        Ok(())
    }

    /// Shut down and wait for the drain to finish.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ShutdownTimeout` if the drain outlives `timeout`.
    pub fn shutdown_and_wait(&self, timeout: Duration) -> Result<(), PoolError> {
        self.shutdown();
        self.await_termination(timeout)
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let lifecycle = self.shared.lifecycle.lock();
        self.shared.counters.snapshot(
            lifecycle.state,
            lifecycle.workers,
            lifecycle.largest_workers,
            self.shared.receiver.len(),
        )
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PoolState {
        self.shared.lifecycle.lock().state
    }

    /// Sizing this pool was built with.
    #[must_use]
    pub fn sizing(&self) -> &PoolSizing {
        &self.shared.sizing
    }

    /// Number of live worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.shared.lifecycle.lock().workers
    }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn queued_tasks(&self) -> usize {
        self.shared.receiver.len()
    }

    /// Whether shutdown has begun.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        !self.state().accepts_tasks()
    }

    /// Whether every worker has exited after shutdown.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state() == PoolState::Terminated
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle = self.shared.lifecycle.lock();
        f.debug_struct("WorkerPool")
            .field("sizing", &self.shared.sizing)
            .field("thread_prefix", &self.shared.thread_options.name_prefix)
            .field("state", &lifecycle.state)
            .field("workers", &lifecycle.workers)
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.shared.lifecycle.lock().state.accepts_tasks() {
            debug!("WorkerPool dropped without explicit shutdown - workers will drain and detach");
        }
        self.shutdown();
    }
}

impl Shared {
    /// Admit `task` into the pool. Returns the task back when the pool is
    /// saturated and the caller has to run it.
    fn admit(self: &Arc<Self>, lifecycle: &mut Lifecycle, task: Task) -> Option<Task> {
        if lifecycle.workers < self.sizing.core_size {
            return self.add_worker(lifecycle, Some(task)).err().and_then(|f| f.task);
        }

        // Workers only ever shrink the queue, so a length checked under the
        // admission lock cannot grow past the bound before the send.
        let task = match lifecycle.sender.as_ref() {
            Some(sender) if self.receiver.len() < self.sizing.queue_capacity => {
                match sender.send(task) {
                    Ok(()) => return None,
                    Err(SendError(task)) => task,
                }
            }
            _ => task,
        };

        if lifecycle.workers < self.sizing.max_size {
            return self.add_worker(lifecycle, Some(task)).err().and_then(|f| f.task);
        }

        Some(task)
    }

    /// Spawn a worker, optionally handing it its first task.
    fn add_worker(
        self: &Arc<Self>,
        lifecycle: &mut Lifecycle,
        first_task: Option<Task>,
    ) -> Result<(), SpawnFailure> {
        let id = self.next_thread_id.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!("{}-{id}", self.thread_options.name_prefix);

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = self.thread_options.stack_size {
            builder = builder.stack_size(size);
        }

        // A failed spawn drops the closure, so the first task travels through
        // a slot the caller can take back.
        let handoff = Arc::new(Mutex::new(first_task));
        let worker = Worker {
            name: name.clone(),
            first_task: Arc::clone(&handoff),
            shared: Arc::clone(self),
        };

        match builder.spawn(move || worker.run()) {
            Ok(_) => {
                lifecycle.workers += 1;
                lifecycle.largest_workers = lifecycle.largest_workers.max(lifecycle.workers);
                debug!(worker = %name, worker_count = lifecycle.workers, "spawned worker");
                Ok(())
            }
            Err(error) => {
                error!(worker = %name, error = %error, "failed to spawn worker thread");
                let task = handoff.lock().take();
                Err(SpawnFailure { error, task })
            }
        }
    }

    /// Pull the next task for `worker`.
    ///
    /// Returns `None` when the worker should exit, in which case its slot has
    /// already been released.
    fn next_task(&self, worker: &str) -> Option<Task> {
        loop {
            let surplus = self.lifecycle.lock().workers > self.sizing.core_size;

            let received = if surplus {
                self.receiver.recv_timeout(self.sizing.keepalive)
            } else {
                self.receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected)
            };

            match received {
                Ok(task) => return Some(task),
                Err(RecvTimeoutError::Disconnected) => {
                    self.release_worker(worker, false);
                    return None;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.release_worker(worker, true) {
                        return None;
                    }
                }
            }
        }
    }

    /// Release a worker slot. An idle release only succeeds while the pool is
    /// above `core_size`.
    fn release_worker(&self, worker: &str, idle: bool) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if idle && lifecycle.workers <= self.sizing.core_size {
            return false;
        }

        lifecycle.workers -= 1;
        if idle {
            self.counters.retired_workers.fetch_add(1, Ordering::Relaxed);
            debug!(worker, worker_count = lifecycle.workers, "retired idle worker");
        }

        if lifecycle.state == PoolState::ShuttingDown && lifecycle.workers == 0 {
            lifecycle.state = PoolState::Terminated;
            self.terminated.notify_all();
            info!("worker pool terminated");
        }

        true
    }

    /// Run a task on the current thread, routing failures to the handler.
    fn run_task(&self, thread_name: &str, task: Task) {
        self.counters.active_tasks.fetch_add(1, Ordering::Relaxed);
        let outcome = task.run();
        self.counters.active_tasks.fetch_sub(1, Ordering::Relaxed);

        match outcome {
            Ok(()) => {
                self.counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
            }
            Err(failure) => {
                self.counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                report_failure(self.failure_handler.as_ref(), thread_name, &failure);
            }
        }
    }
}

struct Worker {
    name: String,
    first_task: Arc<Mutex<Option<Task>>>,
    shared: Arc<Shared>,
}

impl Worker {
    fn run(self) {
        debug!(worker = %self.name, "worker thread started");

        let first_task = self.first_task.lock().take();
        if let Some(task) = first_task {
            self.shared.run_task(&self.name, task);
        }

        while let Some(task) = self.shared.next_task(&self.name) {
            self.shared.run_task(&self.name, task);
        }

        debug!(worker = %self.name, "worker thread exiting");
    }
}
