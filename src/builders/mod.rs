//! Builders to construct pools and dispatchers from configuration.

pub mod pool_builder;

pub use pool_builder::{build_dispatcher, WorkerPoolBuilder};
