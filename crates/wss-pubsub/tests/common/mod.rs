//! Shared fakes for the pub/sub adapter tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wss_plugin_api::{DispatchContext, HandlerError, LoggingConfig, Manifest};
use wss_pubsub::{
    InvocationMetadata, MessageHandler, PubSubAdapter, PubSubMessage, PublishError, Publisher,
    ReturnAddress,
};

pub const RETURN_TOPIC: &str = "http://localhost:8085/acme/replies";

#[derive(Debug, Clone)]
pub struct Published {
    pub address: ReturnAddress,
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl Published {
    pub fn body(&self) -> Value {
        serde_json::from_slice(&self.data).unwrap()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Publisher fake keeping everything it was asked to send
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    reject: bool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records the attempt, then fails it
    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            ..Default::default()
        })
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        address: &ReturnAddress,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<String, PublishError> {
        let mut published = self.published.lock();
        published.push(Published {
            address: address.clone(),
            data,
            attributes,
        });

        if self.reject {
            return Err(PublishError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(format!("msg-{}", published.len()))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Mark the event as handled and echo the session attribute
    Echo,
    Fail,
    Panic,
}

/// Handler fake counting its invocations
#[derive(Debug)]
pub struct TestHandler {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl TestHandler {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for TestHandler {
    type Output = String;

    async fn handle(
        &self,
        message: &PubSubMessage,
        ctx: &mut DispatchContext,
        _meta: &InvocationMetadata,
    ) -> Result<String, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Echo => {
                let session = ctx.logger().session_id().to_string();
                if let Some(event) = ctx.event_mut() {
                    event.insert("handled", true);
                    event.insert("session", session);
                }
                Ok(String::from_utf8_lossy(&message.data).into_owned())
            }
            Behavior::Fail => Err(anyhow::anyhow!("boom").into()),
            Behavior::Panic => {
                if !message.data.is_empty() {
                    panic!("cannot settle");
                }
                Ok(String::new())
            }
        }
    }
}

pub fn manifest() -> Manifest {
    Manifest::new("payments", "payment", "1.0").subscribe("payment.PAYMENT_QUERY", "inline:onQuery")
}

pub fn adapter(publisher: Arc<RecordingPublisher>) -> PubSubAdapter<Arc<RecordingPublisher>> {
    PubSubAdapter::new(&manifest(), LoggingConfig::default(), publisher)
}

/// Event-mode message with correlation id `1234` and a session attribute
pub fn event_message(body: Value) -> PubSubMessage {
    PubSubMessage::json(&body)
        .with_attribute("x-wss-correlation-id", "1234")
        .with_attribute("x-wss-return-topic", RETURN_TOPIC)
        .with_attribute("x-wss-attrib-sessionId", "s-1")
        .with_message_id("m-1")
}

pub fn meta(message: &PubSubMessage) -> InvocationMetadata {
    InvocationMetadata::for_message(message)
}
