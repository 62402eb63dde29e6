//! Panic payload helpers.

use std::any::Any;

/// Render a panic payload as text.
///
/// `panic!` payloads are either `&'static str` or `String`; anything else is
/// reported generically.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
