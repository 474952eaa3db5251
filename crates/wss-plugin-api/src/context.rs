//! Per-invocation dispatch context handed to plugin handlers

use crate::attributes::{Attributes, MetadataSource};
use crate::dispatch::OutboundDispatcher;
use crate::logger::InvocationLogger;
use crate::metadata::PluginDescriptor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use wss_core::{HandlerError, LoggingConfig, WssError};
use wss_envelope::{codec, DecodeError, Event, Manifest};

/// Everything a handler can see about one invocation.
///
/// Built fresh for every request or message and dropped once the response is
/// produced; nothing in it is shared with other invocations.
#[derive(Debug)]
pub struct DispatchContext {
    event: Option<Event>,
    envelope_error: Option<DecodeError>,
    plugin_version: Option<String>,
    payload: Value,
    attributes: Attributes,
    correlation_id: Option<String>,
    manifest: Arc<Manifest>,
    logger: InvocationLogger,
    dispatcher: OutboundDispatcher,
}

impl DispatchContext {
    /// The decoded event, if the payload carried one
    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn event_mut(&mut self) -> Option<&mut Event> {
        self.event.as_mut()
    }

    /// The event, or the reason there is none.
    ///
    /// A payload whose envelope failed to open reports that decode error the
    /// first time; afterwards, and for payloads without an event, this is
    /// `WssError::MissingEvent`.
    pub fn require_event(&mut self) -> Result<&mut Event, WssError> {
        if let Some(err) = self.envelope_error.take() {
            return Err(err.into());
        }
        self.event.as_mut().ok_or(WssError::MissingEvent)
    }

    /// Decode the event's domain payload into an integrator type
    pub fn event_as<T: DeserializeOwned>(&self) -> Result<T, WssError> {
        let event = self.event.as_ref().ok_or(WssError::MissingEvent)?;
        event
            .payload_as()
            .map_err(|e| WssError::Decode(DecodeError::InvalidEvent(e)))
    }

    pub fn take_event(&mut self) -> Option<Event> {
        self.event.take()
    }

    /// The whole structured body as received
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Plugin version reported by the caller
    pub fn plugin_version(&self) -> Option<&str> {
        self.plugin_version.as_deref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Event mode is selected by the presence of a correlation id
    pub fn is_event_mode(&self) -> bool {
        self.correlation_id.is_some()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn logger(&self) -> &InvocationLogger {
        &self.logger
    }

    /// Emit a further event. Not wired to a transport; see [`OutboundDispatcher`].
    pub fn dispatch(&self, event: Event) {
        let _entered = self.logger.span().enter();
        self.dispatcher.dispatch(event);
    }

    /// Record a handler failure: log it and append its trace to the event.
    ///
    /// Returns false when there is no event to record it on.
    pub fn record_failure(&mut self, err: &HandlerError) -> bool {
        let trace = err.trace();
        self.logger.error(format!("Handler failed: {}", trace));

        match self.event.as_mut() {
            Some(event) => {
                event.push_error(trace);
                true
            }
            None => {
                self.logger.warn("Handler failure has no event to be recorded on");
                false
            }
        }
    }
}

/// Assembles a [`DispatchContext`] for each invocation.
///
/// Holds only what is shared read-only across invocations: the manifest and
/// the logging configuration.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    manifest: Arc<Manifest>,
    logging: LoggingConfig,
}

impl ContextBuilder {
    pub fn new(manifest: impl Into<Arc<Manifest>>, logging: LoggingConfig) -> Self {
        Self {
            manifest: manifest.into(),
            logging,
        }
    }

    pub fn for_plugin<P: PluginDescriptor + ?Sized>(plugin: &P, logging: LoggingConfig) -> Self {
        Self::new(plugin.manifest(), logging)
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Build the context for one invocation.
    ///
    /// Never fails: an envelope that cannot be opened leaves the context
    /// without an event, and the error surfaces from
    /// [`DispatchContext::require_event`] if the invocation turns out to be in
    /// event mode.
    pub fn build<M: MetadataSource + ?Sized>(&self, payload: Value, metadata: &M) -> DispatchContext {
        let attributes = metadata.attributes();
        let correlation_id = metadata.correlation_id();

        let (event, plugin_version, envelope_error) = match codec::open(&payload) {
            Ok(envelope) => (envelope.event, envelope.plugin_version, None),
            Err(err) => (None, None, Some(err)),
        };

        let logger = InvocationLogger::new(
            correlation_id.as_deref(),
            event.as_ref().map(Event::name),
            &attributes,
            &self.logging,
        );

        DispatchContext {
            event,
            envelope_error,
            plugin_version,
            payload,
            attributes,
            correlation_id,
            manifest: Arc::clone(&self.manifest),
            logger,
            dispatcher: OutboundDispatcher,
        }
    }
}
