//! Pub/sub side of the envelope protocol
//!
//! Per message:
//! 1. Build the dispatch context from the data and attributes.
//! 2. Without a correlation id, run the handler and hand back its result.
//! 3. In event mode, require a valid return topic before anything else runs.
//! 4. `system.MANIFEST` is answered by publishing the manifest.
//! 5. Otherwise run the handler, fold a failure into the event and publish
//!    the event to the return topic.
//!
//! Publish failures are logged and reported in the [`Outcome`], never raised.

use crate::address::ReturnAddress;
use crate::message::{InvocationMetadata, PubSubMessage};
use crate::publisher::Publisher;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use wss_core::protocol::{CORRELATION_ID, VERSION};
use wss_core::{AppConfig, HandlerError, LoggingConfig, PublishError, WssError};
use wss_envelope::{codec, Manifest};
use wss_plugin_api::{
    guard, negotiate, ContextBuilder, DispatchContext, InvocationLogger, Negotiation,
    PluginDescriptor,
};

/// Plugin code run for each message
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Returned to the caller for pass-through traffic; dropped in event mode
    type Output: Send;

    async fn handle(
        &self,
        message: &PubSubMessage,
        ctx: &mut DispatchContext,
        meta: &InvocationMetadata,
    ) -> Result<Self::Output, HandlerError>;
}

/// Result of sending a reply
#[derive(Debug)]
pub enum Delivery {
    /// Accepted by the broker under this message id
    Published(String),
    /// Logged and swallowed; the coordinator will see no reply
    Failed(PublishError),
}

impl Delivery {
    pub fn is_published(&self) -> bool {
        matches!(self, Delivery::Published(_))
    }
}

/// How an invocation finished
#[derive(Debug)]
pub enum Outcome<T> {
    /// Non-event traffic: whatever the handler returned
    PassThrough(T),
    /// Manifest request answered without running the handler
    Manifest(Delivery),
    /// Event handled and its reply sent
    Event {
        delivery: Delivery,
        /// The handler failed and its error was recorded on the event
        handler_failed: bool,
    },
}

impl<T> Outcome<T> {
    /// Reply delivery, if this was event-mode traffic
    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            Outcome::PassThrough(_) => None,
            Outcome::Manifest(delivery) | Outcome::Event { delivery, .. } => Some(delivery),
        }
    }
}

pub struct PubSubAdapter<P> {
    contexts: ContextBuilder,
    publisher: P,
}

impl<P: Publisher> PubSubAdapter<P> {
    pub fn new<D: PluginDescriptor + ?Sized>(plugin: &D, logging: LoggingConfig, publisher: P) -> Self {
        Self {
            contexts: ContextBuilder::for_plugin(plugin, logging),
            publisher,
        }
    }

    pub fn from_config(config: &AppConfig, publisher: P) -> Self {
        Self::new(&config.manifest, config.logging.clone(), publisher)
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn manifest(&self) -> &Manifest {
        self.contexts.manifest()
    }

    /// Process one message.
    ///
    /// Errors are reserved for failures the transport should see: protocol
    /// violations in event mode, and handler errors in pass-through mode.
    pub async fn handle<H>(
        &self,
        handler: &H,
        message: PubSubMessage,
        meta: InvocationMetadata,
    ) -> Result<Outcome<H::Output>, WssError>
    where
        H: MessageHandler + ?Sized,
    {
        let (payload, data_error) = match message.payload() {
            Ok(payload) => (payload, None),
            Err(err) => (Value::Null, Some(err)),
        };
        let mut ctx = self.contexts.build(payload, &message.attributes);

        let Some(correlation_id) = ctx.correlation_id().map(str::to_string) else {
            debug!(message_id = ?meta.message_id, "No correlation id, passing message through");
            let output = handler.handle(&message, &mut ctx, &meta).await?;
            return Ok(Outcome::PassThrough(output));
        };

        // Event mode from here on
        let address = ReturnAddress::from_attributes(&message.attributes, &correlation_id)
            .map_err(|err| reject(ctx.logger(), err))?;

        if let Some(err) = data_error {
            return Err(reject(ctx.logger(), err.into()));
        }

        let event_name = match ctx.require_event() {
            Ok(event) => event.name().to_string(),
            Err(err) => return Err(reject(ctx.logger(), err)),
        };

        let attributes = reply_attributes(&correlation_id, &self.manifest().version);

        if let Negotiation::Manifest(manifest) = negotiate(&event_name, self.manifest()) {
            ctx.logger().info(format!("Answering manifest request via {}", address));
            let delivery = match codec::encode_manifest(manifest) {
                Ok(body) => self.deliver(ctx.logger(), &address, body, attributes).await,
                Err(err) => undelivered(ctx.logger(), &address, err.into()),
            };
            return Ok(Outcome::Manifest(delivery));
        }

        let handler_failed = match guard(handler.handle(&message, &mut ctx, &meta)).await {
            Ok(_) => false,
            Err(err) => {
                ctx.record_failure(&err);
                true
            }
        };

        let body = match ctx.event() {
            Some(event) => codec::encode_event(event),
            None => return Err(reject(ctx.logger(), WssError::MissingEvent)),
        };
        let delivery = match body {
            Ok(body) => self.deliver(ctx.logger(), &address, body, attributes).await,
            Err(err) => undelivered(ctx.logger(), &address, err.into()),
        };

        Ok(Outcome::Event {
            delivery,
            handler_failed,
        })
    }

    async fn deliver(
        &self,
        logger: &InvocationLogger,
        address: &ReturnAddress,
        body: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Delivery {
        match self.publisher.publish(address, body, attributes).await {
            Ok(message_id) => {
                logger.debug(format!("Reply {} published to {}", message_id, address));
                Delivery::Published(message_id)
            }
            Err(err) => undelivered(logger, address, err),
        }
    }
}

fn reply_attributes(correlation_id: &str, version: &str) -> HashMap<String, String> {
    HashMap::from([
        (CORRELATION_ID.to_string(), correlation_id.to_string()),
        (VERSION.to_string(), version.to_string()),
    ])
}

fn reject(logger: &InvocationLogger, err: WssError) -> WssError {
    logger.error(format!("Event-mode message rejected: {}", err));
    err
}

fn undelivered(logger: &InvocationLogger, address: &ReturnAddress, err: PublishError) -> Delivery {
    logger.error(format!("Failed to publish reply to {}: {}", address, err));
    Delivery::Failed(err)
}
