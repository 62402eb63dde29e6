//! Tests for utility functions

use event_worker_pool::util::{init_tracing, panic_message};

#[test]
fn test_panic_message_from_str() {
    let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "static message");
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
