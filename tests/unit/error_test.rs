//! Tests for error types

use std::io;

use event_worker_pool::core::{PoolError, TaskFailure};

#[test]
fn test_rejected_error() {
    assert_eq!(
        format!("{}", PoolError::Rejected),
        "pool has been shut down; task rejected"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("core_size must be at least 2".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: core_size must be at least 2"
    );
}

#[test]
fn test_spawn_error_from_io() {
    let err: PoolError = io::Error::new(io::ErrorKind::OutOfMemory, "no threads left").into();
    assert_eq!(format!("{}", err), "failed to spawn worker thread: no threads left");
}

#[test]
fn test_task_panicked_failure() {
    let failure = TaskFailure::Panicked {
        message: "index out of bounds".to_string(),
    };
    assert_eq!(format!("{}", failure), "task panicked: index out of bounds");
}
