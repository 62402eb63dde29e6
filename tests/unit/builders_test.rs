//! Tests for builder modules

use std::time::Duration;

use event_worker_pool::builders::{build_dispatcher, WorkerPoolBuilder};
use event_worker_pool::config::{ExecutorConfig, PoolSizing};
use event_worker_pool::core::{LogFailureHandler, PoolError, PoolState};
use event_worker_pool::runtime::Dispatcher;

#[test]
fn test_pool_builder_defaults() {
    let builder = WorkerPoolBuilder::new();
    assert_eq!(*builder.current_sizing(), PoolSizing::detect());

    let pool = builder.build().unwrap();
    assert_eq!(pool.state(), PoolState::Unstarted);
    assert_eq!(*pool.sizing(), PoolSizing::detect());
}

#[test]
fn test_pool_builder_from_config() {
    let cfg = ExecutorConfig {
        core_size: Some(2),
        max_size: Some(3),
        queue_capacity: Some(7),
        keepalive_secs: Some(1),
        thread_name_prefix: Some("canal-execute-thread".into()),
        ..ExecutorConfig::default()
    };

    let pool = WorkerPoolBuilder::from_config(&cfg).unwrap().build().unwrap();
    assert_eq!(
        *pool.sizing(),
        PoolSizing {
            core_size: 2,
            max_size: 3,
            queue_capacity: 7,
            keepalive: Duration::from_secs(1),
        }
    );

    let (tx, rx) = crossbeam_channel::bounded(1);
    pool.execute(move || {
        let name = std::thread::current().name().map(str::to_owned);
        tx.send(name).unwrap();
    })
    .unwrap();
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
        Some("canal-execute-thread-1")
    );
    pool.shutdown_and_wait(Duration::from_secs(5)).unwrap();
}

#[test]
fn test_pool_builder_rejects_invalid_sizing() {
    let err = WorkerPoolBuilder::new()
        .core_size(3)
        .max_size(2)
        .build()
        .unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}

#[test]
fn test_build_dispatcher_enabled() {
    let cfg = ExecutorConfig {
        core_size: Some(2),
        max_size: Some(2),
        queue_capacity: Some(4),
        ..ExecutorConfig::default()
    };

    let dispatcher = build_dispatcher(&cfg, LogFailureHandler).unwrap();
    assert!(matches!(dispatcher, Dispatcher::Pooled(_)));
    dispatcher.shutdown();
}

#[test]
fn test_build_dispatcher_disabled() {
    let cfg = ExecutorConfig {
        enabled: false,
        ..ExecutorConfig::default()
    };

    let dispatcher = build_dispatcher(&cfg, LogFailureHandler).unwrap();
    assert!(matches!(dispatcher, Dispatcher::Inline { .. }));
    assert!(dispatcher.pool().is_none());
}

#[test]
fn test_build_dispatcher_invalid_config() {
    let cfg = ExecutorConfig {
        core_size: Some(5),
        max_size: Some(2),
        ..ExecutorConfig::default()
    };
    assert!(build_dispatcher(&cfg, LogFailureHandler).is_err());
}
