//! Guarded handler invocation
//!
//! Handler failures must never abort response production. [`guard`] turns
//! both returned errors and panics into a [`HandlerError`]; the adapter then
//! records it on the event via [`DispatchContext::record_failure`].
//!
//! [`DispatchContext::record_failure`]: crate::context::DispatchContext::record_failure

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use wss_core::HandlerError;

/// Await a handler future, converting a panic into `HandlerError::Panicked`
pub async fn guard<F, T>(future: F) -> Result<T, HandlerError>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    catch_panic(future).await?
}

/// Await any future, converting a panic into `HandlerError::Panicked`
pub async fn catch_panic<F: Future>(future: F) -> Result<F::Output, HandlerError> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| HandlerError::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
