//! Configuration models for pool sizing and executor overrides.

pub mod pool;

pub use pool::{ExecutorConfig, PoolSizing, ENV_PREFIX};
