//! Echo plugin: answers every event with itself, marked as handled.
//!
//! Setting `fail: true` on the event makes the handler fail, which exercises
//! the error path end to end. `notify: true` emits a follow-up event through
//! the context's outbound dispatcher.

use async_trait::async_trait;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use wss_http::{EnvelopeReply, HandlerRejection, WssContext};
use wss_plugin_api::{DispatchContext, Event, HandlerError};
use wss_pubsub::{InvocationMetadata, MessageHandler, PubSubMessage};

#[derive(Debug, Default, Deserialize)]
struct EchoRequest {
    #[serde(default)]
    fail: bool,
    #[serde(default)]
    notify: bool,
}

#[derive(Debug, Clone)]
pub struct EchoPlugin {
    name: Arc<str>,
}

impl EchoPlugin {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared by both transports
    pub fn echo(&self, ctx: &mut DispatchContext) -> Result<(), HandlerError> {
        if !ctx.is_event_mode() {
            ctx.logger().debug("Echo plugin received non-event traffic");
            return Ok(());
        }

        let request: EchoRequest = ctx.event_as().unwrap_or_default();
        if request.fail {
            return Err(HandlerError::msg("echo failure requested"));
        }

        let Some(event) = ctx.event_mut() else {
            return Ok(());
        };
        event.insert("handledBy", self.name());
        let follow_up = Event::new(format!("{}.ECHOED", event.subsystem()));

        if request.notify {
            ctx.dispatch(follow_up);
        }
        Ok(())
    }
}

/// HTTP route behind the event layer
pub async fn handle_event(
    State(plugin): State<EchoPlugin>,
    ctx: WssContext,
) -> Result<impl IntoResponse, HandlerRejection> {
    ctx.with(|ctx| plugin.echo(ctx))?;
    Ok(EnvelopeReply)
}

#[async_trait]
impl MessageHandler for EchoPlugin {
    type Output = ();

    async fn handle(
        &self,
        _message: &PubSubMessage,
        ctx: &mut DispatchContext,
        _meta: &InvocationMetadata,
    ) -> Result<(), HandlerError> {
        self.echo(ctx)
    }
}
