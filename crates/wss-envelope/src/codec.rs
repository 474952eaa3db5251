//! Envelope decoding and encoding
//!
//! The body of every request, response and message is a JSON object that
//! carries the event (or manifest) under [`ENVELOPE_KEY`] plus a few
//! caller-supplied fields such as [`PLUGIN_VERSION_KEY`].

use crate::event::Event;
use crate::manifest::Manifest;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Body field holding the `Event` or `Manifest`
pub const ENVELOPE_KEY: &str = "event";

/// Body field holding the plugin version reported by the caller
pub const PLUGIN_VERSION_KEY: &str = "pluginVersion";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("envelope has no `{ENVELOPE_KEY}` field")]
    MissingEvent,

    #[error("envelope `{ENVELOPE_KEY}` field is not a valid event: {0}")]
    InvalidEvent(serde_json::Error),
}

#[derive(Error, Debug)]
#[error("failed to encode envelope: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// An opened envelope: the optional event plus the remaining body fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub event: Option<Event>,
    pub plugin_version: Option<String>,
    /// Every other top-level field, untouched
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Take the event, failing if the envelope carried none
    pub fn require_event(self) -> Result<Event, DecodeError> {
        self.event.ok_or(DecodeError::MissingEvent)
    }
}

#[derive(Serialize)]
struct Wrapped<'a, T> {
    // Must stay in step with ENVELOPE_KEY
    event: &'a T,
}

/// Parse a raw body into JSON. An empty body is treated as `{}`.
pub fn parse_payload(raw: &[u8]) -> Result<Value, DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_slice(raw)?)
}

/// Split an already parsed body into its envelope parts.
///
/// A missing or `null` event is not an error here; callers that need one use
/// [`Envelope::require_event`].
pub fn open(payload: &Value) -> Result<Envelope, DecodeError> {
    let object = payload
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(kind_of(payload)))?;

    let mut extra = object.clone();
    let event = match extra.remove(ENVELOPE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value).map_err(DecodeError::InvalidEvent)?),
    };
    let plugin_version = match extra.remove(PLUGIN_VERSION_KEY) {
        Some(Value::String(version)) => Some(version),
        Some(Value::Number(version)) => Some(version.to_string()),
        _ => None,
    };

    Ok(Envelope {
        event,
        plugin_version,
        extra,
    })
}

/// Decode a raw body into the event it carries
pub fn decode(raw: &[u8]) -> Result<Event, DecodeError> {
    open(&parse_payload(raw)?)?.require_event()
}

/// Wrap an event under the envelope key
pub fn encode_event(event: &Event) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(&Wrapped { event })?)
}

/// Wrap a manifest under the envelope key
pub fn encode_manifest(manifest: &Manifest) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(&Wrapped { event: manifest })?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
