//! Tests for configuration validation and resolution

use std::fs;
use std::time::Duration;

use event_worker_pool::config::{ExecutorConfig, PoolSizing};

fn sizing(core_size: usize, max_size: usize, queue_capacity: usize) -> PoolSizing {
    PoolSizing {
        core_size,
        max_size,
        queue_capacity,
        keepalive: Duration::from_secs(60),
    }
}

#[test]
fn test_pool_sizing_validation() {
    assert!(sizing(2, 2, 1).validate().is_ok());
    assert!(sizing(4, 9, 180_000).validate().is_ok());
}

#[test]
fn test_pool_sizing_core_below_two() {
    assert!(sizing(1, 4, 10).validate().is_err());
}

#[test]
fn test_pool_sizing_max_below_core() {
    assert!(sizing(4, 3, 10).validate().is_err());
}

#[test]
fn test_pool_sizing_zero_queue() {
    assert!(sizing(2, 4, 0).validate().is_err());
}

#[test]
fn test_pool_sizing_zero_keepalive() {
    let zero = PoolSizing {
        keepalive: Duration::ZERO,
        ..sizing(2, 4, 10)
    };
    assert!(zero.validate().is_err());
}

#[test]
fn test_executor_config_defaults() {
    let cfg = ExecutorConfig::default();
    assert!(cfg.enabled);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.resolve(4).unwrap(), PoolSizing::for_parallelism(4));
}

#[test]
fn test_executor_config_overrides() {
    let cfg = ExecutorConfig {
        core_size: Some(3),
        max_size: Some(6),
        keepalive_secs: Some(5),
        ..ExecutorConfig::default()
    };

    let resolved = cfg.resolve(1).unwrap();
    assert_eq!(resolved.core_size, 3);
    assert_eq!(resolved.max_size, 6);
    assert_eq!(resolved.queue_capacity, 120_000);
    assert_eq!(resolved.keepalive, Duration::from_secs(5));
}

#[test]
fn test_executor_config_core_exceeds_max() {
    let cfg = ExecutorConfig {
        core_size: Some(8),
        max_size: Some(4),
        ..ExecutorConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_executor_config_core_override_exceeds_default_max() {
    // Default max on one CPU is 3.
    let cfg = ExecutorConfig {
        core_size: Some(4),
        ..ExecutorConfig::default()
    };
    assert!(cfg.resolve(1).is_err());
}

#[test]
fn test_executor_config_zero_queue() {
    let cfg = ExecutorConfig {
        queue_capacity: Some(0),
        ..ExecutorConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_executor_config_from_json() {
    let json = r#"{
        "enabled": true,
        "core_size": 2,
        "max_size": 8,
        "queue_capacity": 1000,
        "keepalive_secs": 30,
        "thread_name_prefix": "canal-execute-thread"
    }"#;

    let cfg = ExecutorConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.max_size, Some(8));
    assert_eq!(cfg.thread_name_prefix.as_deref(), Some("canal-execute-thread"));
}

#[test]
fn test_executor_config_from_partial_json() {
    let cfg = ExecutorConfig::from_json_str(r#"{ "enabled": false }"#).unwrap();
    assert!(!cfg.enabled);
    assert_eq!(cfg.core_size, None);
}

#[test]
fn test_executor_config_from_invalid_json() {
    assert!(ExecutorConfig::from_json_str(r#"{ "core_size": "two" }"#).is_err());
    assert!(ExecutorConfig::from_json_str(r#"{ "max_size": 0 }"#).is_err());
}

#[test]
fn test_executor_config_from_vars() {
    let vars = [
        ("WORKER_POOL_ENABLED", "false"),
        ("WORKER_POOL_CORE_SIZE", "2"),
        ("WORKER_POOL_MAX_SIZE", " 10 "),
        ("WORKER_POOL_QUEUE_CAPACITY", "500"),
        ("WORKER_POOL_KEEPALIVE_SECS", "15"),
        ("WORKER_POOL_THREAD_PREFIX", "canal-execute-thread"),
        ("PATH", "/usr/bin"),
    ];

    let cfg = ExecutorConfig::from_vars(vars).unwrap();
    assert_eq!(
        cfg,
        ExecutorConfig {
            enabled: false,
            core_size: Some(2),
            max_size: Some(10),
            queue_capacity: Some(500),
            keepalive_secs: Some(15),
            thread_name_prefix: Some("canal-execute-thread".into()),
        }
    );
}

#[test]
fn test_executor_config_from_vars_invalid_number() {
    let err = ExecutorConfig::from_vars([("WORKER_POOL_MAX_SIZE", "lots")]).unwrap_err();
    assert!(err.contains("WORKER_POOL_MAX_SIZE"));
}

#[test]
fn test_executor_config_from_malformed_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "WORKER_POOL_CORE_SIZE 3\n").unwrap();

    let err = ExecutorConfig::from_env_file(&path).unwrap_err();
    assert!(err.starts_with("failed to load .env file"));
}

#[test]
fn test_executor_config_from_missing_env_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ExecutorConfig::from_env_file(dir.path().join(".env")).is_ok());
}
