//! Push-subscription endpoint
//!
//! The broker POSTs each message as
//! `{"message": {"data", "attributes", "messageId", "publishTime"}, "subscription"}`
//! with `data` base64 encoded. Any non-2xx answer makes the broker redeliver.

use crate::adapter::{MessageHandler, PubSubAdapter};
use crate::message::{InvocationMetadata, PubSubMessage};
use crate::publisher::Publisher;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};
use wss_http::ErrorResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct PushRequest {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,
}

impl PushRequest {
    /// Decode into the message and its delivery metadata
    pub fn into_parts(self) -> Result<(PubSubMessage, InvocationMetadata), base64::DecodeError> {
        let data = match self.message.data {
            Some(encoded) => BASE64_STANDARD.decode(encoded)?,
            None => Vec::new(),
        };

        let message = PubSubMessage {
            data: data.into(),
            attributes: self.message.attributes,
            message_id: self.message.message_id,
            publish_time: self.message.publish_time,
        };

        let mut meta = InvocationMetadata::for_message(&message);
        meta.subscription = self.subscription;
        Ok((message, meta))
    }
}

struct PushState<H, P> {
    adapter: PubSubAdapter<P>,
    handler: H,
}

/// Router serving push deliveries on `path`
pub fn push_router<H, P>(path: &str, adapter: PubSubAdapter<P>, handler: H) -> Router
where
    H: MessageHandler + 'static,
    P: Publisher + 'static,
{
    Router::new()
        .route(path, post(push_endpoint::<H, P>))
        .with_state(Arc::new(PushState { adapter, handler }))
}

async fn push_endpoint<H, P>(State(state): State<Arc<PushState<H, P>>>, body: Bytes) -> Response
where
    H: MessageHandler + 'static,
    P: Publisher + 'static,
{
    let request: PushRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => return bad_push("invalid_push_body", err.to_string()),
    };

    let (message, meta) = match request.into_parts() {
        Ok(parts) => parts,
        Err(err) => return bad_push("invalid_message_data", err.to_string()),
    };

    match state.adapter.handle(&state.handler, message, meta).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(error = %err, code = err.code(), "Push delivery failed");
            let body = ErrorResponse::new(err.code(), err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn bad_push(code: &str, message: String) -> Response {
    warn!(code = code, error = %message, "Undecodable push request");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(code, message))).into_response()
}
