//! Telemetry helpers for structured logging and tracing.
//!
//! Pool events are attributed to workers by thread name (`pool-thread-N` or
//! the configured prefix). Caller-run tasks log from the submitting thread, so
//! the thread name column is what separates saturation fallbacks from pooled
//! execution in the output.

/// Install a default `fmt` subscriber filtered by `RUST_LOG`, unless the
/// application already set one.
///
/// Thread names are always printed. Worker spawn and retirement events are
/// emitted at `debug`, so `RUST_LOG=event_worker_pool=debug` shows the pool
/// growing toward `max_size` and shrinking back to `core_size`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .with_target(false)
        .try_init();
}
