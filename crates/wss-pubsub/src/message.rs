//! Inbound pub/sub messages

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use wss_envelope::{codec, DecodeError};

/// One delivered pub/sub message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PubSubMessage {
    /// Raw message data, expected to be a JSON envelope in event mode
    pub data: Bytes,

    /// Message attributes, carrying correlation id, return topic and
    /// `x-wss-attrib-*` entries
    pub attributes: HashMap<String, String>,

    pub message_id: Option<String>,

    pub publish_time: Option<DateTime<Utc>>,
}

impl PubSubMessage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Message whose data is the JSON encoding of `value`
    pub fn json(value: &Value) -> Self {
        Self::new(value.to_string().into_bytes())
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Parse the data as JSON; empty data is `{}`
    pub fn payload(&self) -> Result<Value, DecodeError> {
        codec::parse_payload(&self.data)
    }
}

/// Delivery details handed to the handler next to the message
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationMetadata {
    pub message_id: Option<String>,
    pub publish_time: Option<DateTime<Utc>>,
    /// Subscription the message was delivered through, when known
    pub subscription: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl InvocationMetadata {
    pub fn for_message(message: &PubSubMessage) -> Self {
        Self {
            message_id: message.message_id.clone(),
            publish_time: message.publish_time,
            subscription: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_subscription(mut self, subscription: impl Into<String>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }
}
