//! Tests for the dispatcher and the tokio bridge

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use event_worker_pool::builders::WorkerPoolBuilder;
use event_worker_pool::core::{LogFailureHandler, PoolError, Task};
use event_worker_pool::runtime::{await_termination_async, submit_async, Dispatcher};

#[test]
fn test_pooled_dispatcher_forwards_to_pool() {
    let pool = WorkerPoolBuilder::new()
        .core_size(2)
        .max_size(2)
        .queue_capacity(8)
        .build()
        .unwrap();
    let dispatcher = Dispatcher::Pooled(pool);
    let executed = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let executed = Arc::clone(&executed);
        dispatcher
            .execute(move || {
                executed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    dispatcher.shutdown();

    let pool = dispatcher.pool().expect("pooled dispatcher");
    pool.await_termination(Duration::from_secs(5)).unwrap();
    assert_eq!(executed.load(Ordering::SeqCst), 5);
    assert!(matches!(dispatcher.execute(|| {}), Err(PoolError::Rejected)));
}

#[test]
fn test_inline_dispatcher_fallible_error_contained() {
    let dispatcher = Dispatcher::inline(Arc::new(LogFailureHandler));
    let result = dispatcher.execute_fallible(|| Err(anyhow::anyhow!("downstream unavailable")));
    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_submit_async_rejected_after_shutdown() {
    let pool = Arc::new(
        WorkerPoolBuilder::new()
            .core_size(2)
            .max_size(2)
            .queue_capacity(2)
            .build()
            .unwrap(),
    );

    let (tx, rx) = tokio::sync::oneshot::channel();
    submit_async(Arc::clone(&pool), Task::new(move || tx.send(123).unwrap()))
        .await
        .unwrap();
    assert_eq!(rx.await.expect("oneshot result"), 123);

    pool.shutdown();
    await_termination_async(Arc::clone(&pool), Duration::from_secs(5))
        .await
        .unwrap();

    let err = submit_async(Arc::clone(&pool), Task::new(|| {}))
        .await
        .unwrap_err();
    assert!(matches!(err, PoolError::Rejected));
}
