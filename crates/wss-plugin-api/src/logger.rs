//! Invocation-scoped logger
//!
//! Every line is emitted inside a `wss_invocation` span carrying the
//! correlation id, session and club of the invocation, so a log collector can
//! group one request's output without the handler repeating those fields.

use crate::attributes::Attributes;
use std::fmt::Display;
use tracing::{debug, error, info, info_span, trace, warn, Level, Span};
use wss_core::protocol::{NO_CLUB, NO_SESSION};
use wss_core::LoggingConfig;

#[derive(Debug, Clone)]
pub struct InvocationLogger {
    span: Span,
    threshold: Level,
    session_id: String,
    club_id: String,
}

impl InvocationLogger {
    pub fn new(
        correlation_id: Option<&str>,
        event_name: Option<&str>,
        attributes: &Attributes,
        config: &LoggingConfig,
    ) -> Self {
        let session_id = attributes.session_id().unwrap_or(NO_SESSION).to_string();
        let club_id = attributes.club_id().unwrap_or(NO_CLUB).to_string();

        let span = info_span!(
            "wss_invocation",
            correlation_id = correlation_id.unwrap_or("-"),
            session_id = %session_id,
            club_id = %club_id,
            event = event_name.unwrap_or("-"),
        );

        Self {
            span,
            threshold: config.threshold(),
            session_id,
            club_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn club_id(&self) -> &str {
        &self.club_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Whether `level` passes the configured threshold
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.threshold
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }
        let _entered = self.span.enter();
        match level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            Level::INFO => info!("{}", message),
            Level::DEBUG => debug!("{}", message),
            _ => trace!("{}", message),
        }
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::ERROR, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::WARN, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::INFO, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::DEBUG, message);
    }
}
