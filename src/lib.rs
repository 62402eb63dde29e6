//! # Event Worker Pool
//!
//! A bounded, backpressure-aware thread pool for running event-handling work
//! off a producer thread.
//!
//! Producers such as change-data-capture consumers receive work at a variable
//! rate. This crate dispatches that work to a fixed-capacity set of worker
//! threads without growing memory without bound, without dropping work, and
//! without letting a misbehaving task take a worker or the process down.
//!
//! ## Key Features
//!
//! - **Sizing policy**: core and maximum worker counts plus queue capacity
//!   derived from the machine's parallelism, every value overridable
//! - **Bounded queue**: strict FIFO buffer with a fixed capacity
//! - **Caller-runs backpressure**: when the queue and the worker set are both
//!   full, the submitting thread runs the task itself
//! - **Failure isolation**: panics and task errors are contained at the worker
//!   boundary and handed to a pluggable [`FailureHandler`](core::FailureHandler)
//! - **Elastic workers**: workers above the core size retire after an idle
//!   keepalive
//! - **Graceful shutdown**: queued and in-flight work drains before workers exit
//!
//! ## WorkerPool
//!
//! ```rust,ignore
//! use event_worker_pool::builders::WorkerPoolBuilder;
//! use event_worker_pool::config::ExecutorConfig;
//! use std::time::Duration;
//!
//! let pool = WorkerPoolBuilder::from_config(&ExecutorConfig::from_env()?)?
//!     .thread_name_prefix("canal-execute-thread")
//!     .build()?;
//!
//! pool.execute(move || apply_row_change(entry))?;
//! pool.execute_fallible(move || {
//!     index_document(&doc)?;
//!     Ok(())
//! })?;
//!
//! pool.shutdown_and_wait(Duration::from_secs(30))?;
//! ```
//!
//! ## Dispatcher
//!
//! When the pool is switched off by configuration, producers can keep the same
//! call sites through a [`Dispatcher`](runtime::Dispatcher):
//!
//! ```rust,ignore
//! use event_worker_pool::builders::build_dispatcher;
//! use event_worker_pool::core::LogFailureHandler;
//!
//! let dispatcher = build_dispatcher(&config, LogFailureHandler)?;
//! dispatcher.execute(move || apply_row_change(entry))?;
//! ```
//!
//! For complete examples, see `tests/worker_pool_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core pool abstractions: tasks, failure isolation, and the worker pool.
pub mod core;
/// Configuration models for pool sizing and executor overrides.
pub mod config;
/// Builders to construct pools and dispatchers from configuration.
pub mod builders;
/// Runtime adapters: producer-facing dispatcher and async bridge.
pub mod runtime;
/// Shared utilities.
pub mod util;
