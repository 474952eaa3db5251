//! Handler-facing types: the context extractor and the response types the
//! event middleware looks for.

use crate::types::ErrorResponse;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use wss_plugin_api::{DispatchContext, HandlerError};

/// Shared handle on the invocation's [`DispatchContext`].
///
/// The middleware keeps one clone and hands the other to the route handler
/// through request extensions. Do not hold the lock across an `.await`.
#[derive(Clone)]
pub struct WssContext(Arc<Mutex<DispatchContext>>);

impl WssContext {
    pub fn new(ctx: DispatchContext) -> Self {
        Self(Arc::new(Mutex::new(ctx)))
    }

    pub fn lock(&self) -> MutexGuard<'_, DispatchContext> {
        self.0.lock()
    }

    /// Run `f` with the context locked
    pub fn with<R>(&self, f: impl FnOnce(&mut DispatchContext) -> R) -> R {
        let mut ctx = self.0.lock();
        f(&mut *ctx)
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.0.lock().correlation_id().map(str::to_string)
    }
}

impl std::fmt::Debug for WssContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WssContext")
            .field("correlation_id", &self.correlation_id())
            .finish()
    }
}

impl<S> FromRequestParts<S> for WssContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<WssContext>().cloned().ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "missing_context",
                    "Dispatch context not found; is the event layer installed on this route?",
                )),
            )
        })
    }
}

/// Empty reply for handlers that only work on the context.
///
/// In event mode the middleware replaces it with the encoded event, as it
/// does for any response not wrapped in [`OwnResponse`]. Outside event mode
/// this is an empty `204`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeReply;

impl IntoResponse for EnvelopeReply {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// A response the handler sends on its own.
///
/// The event layer returns it unchanged and skips the envelope reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnResponse<T>(pub T);

/// Extension set on responses produced through [`OwnResponse`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct SentByHandler;

impl<T: IntoResponse> IntoResponse for OwnResponse<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        response.extensions_mut().insert(SentByHandler);
        response
    }
}

/// Handler failure carried on a response so the middleware can fold it into
/// the event. Also left on the final response for outer layers to inspect.
#[derive(Debug, Clone)]
pub struct CapturedFailure(pub Arc<HandlerError>);

/// Error type for route handlers behind the event layer.
///
/// Outside event mode it renders as a plain `500` error body.
#[derive(Debug)]
pub struct HandlerRejection(pub HandlerError);

impl From<HandlerError> for HandlerRejection {
    fn from(err: HandlerError) -> Self {
        HandlerRejection(err)
    }
}

impl From<anyhow::Error> for HandlerRejection {
    fn from(err: anyhow::Error) -> Self {
        HandlerRejection(HandlerError::Failed(err))
    }
}

impl IntoResponse for HandlerRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new("handler_error", self.0.to_string());
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(CapturedFailure(Arc::new(self.0)));
        response
    }
}
