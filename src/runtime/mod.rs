//! Runtime adapters: the producer-facing dispatcher and the tokio bridge.

pub mod dispatch;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_bridge;

pub use dispatch::Dispatcher;
#[cfg(feature = "tokio-runtime")]
pub use tokio_bridge::{await_termination_async, submit_async};
