//! Error responses for requests the envelope protocol cannot answer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wss_core::WssError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A [`WssError`] on its way back to the HTTP caller.
///
/// Used for failures that happen before an event can carry them: unreadable
/// bodies, missing events and the like.
#[derive(Debug)]
pub struct ApiError(pub WssError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WssError::Decode(_)
            | WssError::MissingEvent
            | WssError::MissingReturnTopic { .. }
            | WssError::InvalidReturnTopic { .. } => StatusCode::BAD_REQUEST,
            WssError::Publish(_) => StatusCode::BAD_GATEWAY,
            WssError::Handler(_) | WssError::Encode(_) | WssError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<WssError> for ApiError {
    fn from(err: WssError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.0.code(), self.0.to_string());
        (self.status(), Json(body)).into_response()
    }
}
