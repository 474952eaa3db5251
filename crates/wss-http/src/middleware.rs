//! Event middleware: the HTTP side of the envelope protocol
//!
//! Per request:
//! 1. Read and parse the body; unparsable bodies are rejected as decode errors.
//! 2. Build the dispatch context and attach it to the request.
//! 3. Without a correlation id the request passes straight through.
//! 4. In event mode the envelope must carry an event.
//! 5. `system.MANIFEST` is answered with the manifest, the handler never runs.
//! 6. Otherwise the handler runs. A [`CapturedFailure`] goes through the error
//!    stage, an [`OwnResponse`](crate::OwnResponse) is returned as the handler produced it, and
//!    anything else is replaced by the encoded event.

use crate::extract::{CapturedFailure, SentByHandler, WssContext};
use crate::types::{ApiError, ErrorResponse};
use crate::HttpAdapter;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wss_core::protocol::{CORRELATION_ID, VERSION};
use wss_core::{HandlerError, WssError};
use wss_envelope::{codec, Manifest};
use wss_plugin_api::{catch_panic, negotiate, Negotiation};

// ============================================================================
// Event Middleware
// ============================================================================

pub async fn event_middleware(
    State(adapter): State<Arc<HttpAdapter>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, adapter.body_limit()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let err = err.into_inner();
            if err.is::<LengthLimitError>() {
                warn!(limit = adapter.body_limit(), "Request body exceeds the configured limit");
                let error = ErrorResponse::new("body_too_large", err.to_string());
                return (StatusCode::PAYLOAD_TOO_LARGE, Json(error)).into_response();
            }
            warn!(error = %err, "Failed to read request body");
            let error = ErrorResponse::new("invalid_body", err.to_string());
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    let payload = match codec::parse_payload(&bytes) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "Request body is not JSON");
            return ApiError(err.into()).into_response();
        }
    };

    let ctx = WssContext::new(adapter.contexts().build(payload, &parts.headers));
    parts.extensions.insert(ctx.clone());
    let request = Request::from_parts(parts, Body::from(bytes));

    let Some(correlation_id) = ctx.correlation_id() else {
        debug!("No correlation id, passing request through");
        return next.run(request).await;
    };

    // Event mode from here on
    let event_name = match ctx.with(|ctx| ctx.require_event().map(|event| event.name().to_string())) {
        Ok(name) => name,
        Err(err) => {
            error!(correlation_id = %correlation_id, error = %err, "Event-mode request rejected");
            return ApiError(err).into_response();
        }
    };

    if let Negotiation::Manifest(manifest) = negotiate(&event_name, adapter.manifest()) {
        info!(correlation_id = %correlation_id, "Answering manifest request");
        return manifest_response(&correlation_id, manifest);
    }

    let response = match catch_panic(next.run(request)).await {
        Ok(response) => response,
        Err(err) => return error_stage(&ctx, &correlation_id, adapter.manifest(), Arc::new(err)),
    };

    if let Some(CapturedFailure(err)) = response.extensions().get::<CapturedFailure>().cloned() {
        return error_stage(&ctx, &correlation_id, adapter.manifest(), err);
    }

    if response.extensions().get::<SentByHandler>().is_some() {
        debug!(correlation_id = %correlation_id, "Handler answered on its own, skipping envelope reply");
        return response;
    }

    event_response(&ctx, StatusCode::OK, &correlation_id, adapter.manifest())
}

/// Error stage for event-mode requests: record the failure on the event and
/// still reply with the envelope, as a server error.
///
/// The failure stays attached to the response so outer layers can log it.
fn error_stage(
    ctx: &WssContext,
    correlation_id: &str,
    manifest: &Manifest,
    err: Arc<HandlerError>,
) -> Response {
    ctx.with(|ctx| ctx.record_failure(&err));

    let mut response = event_response(ctx, StatusCode::INTERNAL_SERVER_ERROR, correlation_id, manifest);
    response.extensions_mut().insert(CapturedFailure(err));
    response
}

// ============================================================================
// Envelope Responses
// ============================================================================

fn event_response(
    ctx: &WssContext,
    status: StatusCode,
    correlation_id: &str,
    manifest: &Manifest,
) -> Response {
    let encoded = ctx.with(|ctx| match ctx.event() {
        Some(event) => codec::encode_event(event).map_err(WssError::from),
        None => Err(WssError::MissingEvent),
    });

    match encoded {
        Ok(body) => envelope_response(status, body, correlation_id, &manifest.version),
        Err(err) => {
            error!(correlation_id = %correlation_id, error = %err, "Failed to encode event reply");
            ApiError(err).into_response()
        }
    }
}

fn manifest_response(correlation_id: &str, manifest: &Manifest) -> Response {
    match codec::encode_manifest(manifest) {
        Ok(body) => envelope_response(StatusCode::OK, body, correlation_id, &manifest.version),
        Err(err) => {
            error!(correlation_id = %correlation_id, error = %err, "Failed to encode manifest");
            ApiError(err.into()).into_response()
        }
    }
}

fn envelope_response(
    status: StatusCode,
    body: Vec<u8>,
    correlation_id: &str,
    version: &str,
) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    echo_header(headers, CORRELATION_ID, correlation_id);
    echo_header(headers, VERSION, version);
    response
}

fn echo_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(_) => warn!(header = name, value = value, "Value cannot be sent as a header, omitting"),
    }
}

// ============================================================================
// Health Check Handler
// ============================================================================

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
    }))
}
