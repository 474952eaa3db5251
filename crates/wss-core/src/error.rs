//! Error types for WSS plugin dispatch.
//!
//! Errors fall in two groups. Protocol-contract failures (`Decode`,
//! `MissingEvent`, `MissingReturnTopic`) are raised before any handler runs
//! and go back to the hosting transport unchanged. Handler and publish
//! failures happen once a dispatch context exists and are folded into the
//! event's `errors` or logged instead.

use std::error::Error as StdError;
use thiserror::Error;
use wss_envelope::{DecodeError, EncodeError};

/// Result type alias using WssError as the error type.
pub type Result<T> = std::result::Result<T, WssError>;

/// Top-level error type for dispatch operations.
#[derive(Debug, Error)]
pub enum WssError {
    /// Body could not be parsed as an envelope
    #[error("Decode error: {0}")]
    Decode(DecodeError),

    /// Event-mode traffic without an event in the envelope
    #[error("Event-mode request carries no event")]
    MissingEvent,

    /// Event-mode pub/sub message without a return address
    #[error("Event-mode message {correlation_id} has no return topic")]
    MissingReturnTopic { correlation_id: String },

    /// Return address present but not `apiEndpoint/projectId/topic`
    #[error("Invalid return topic '{value}': {reason}")]
    InvalidReturnTopic { value: String, reason: String },

    /// Plugin handler failed
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Outbound publish to the coordinator failed
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Reply could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<DecodeError> for WssError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MissingEvent => WssError::MissingEvent,
            other => WssError::Decode(other),
        }
    }
}

impl WssError {
    /// Stable machine-readable code, used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            WssError::Decode(_) => "decode_error",
            WssError::MissingEvent => "missing_event",
            WssError::MissingReturnTopic { .. } => "missing_return_topic",
            WssError::InvalidReturnTopic { .. } => "invalid_return_topic",
            WssError::Handler(_) => "handler_error",
            WssError::Publish(_) => "publish_error",
            WssError::Encode(_) => "encode_error",
            WssError::Config(_) => "config_error",
        }
    }

    /// Returns true if the caller broke the protocol contract, as opposed to
    /// a failure inside the plugin or on the way back out.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            WssError::Decode(_)
                | WssError::MissingEvent
                | WssError::MissingReturnTopic { .. }
                | WssError::InvalidReturnTopic { .. }
        )
    }
}

/// Failure raised by plugin handler code.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler returned an error
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// Handler panicked; the payload is the panic message when it was a string
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        HandlerError::Failed(anyhow::Error::msg(message))
    }

    /// Full diagnostic text recorded into the event, including the cause
    /// chain and a backtrace when one was captured.
    pub fn trace(&self) -> String {
        match self {
            HandlerError::Failed(err) => format!("{err:?}"),
            HandlerError::Panicked(message) => format!("handler panicked: {message}"),
        }
    }
}

/// Failure sending a reply back to the coordinator.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Network or client failure
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Broker answered with a non-success status
    #[error("publish rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Broker answered 2xx but the reply could not be understood
    #[error("unexpected publish response: {0}")]
    InvalidResponse(String),

    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] EncodeError),
}

impl PublishError {
    pub fn transport(err: impl StdError + Send + Sync + 'static) -> Self {
        PublishError::Transport(Box::new(err))
    }
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
