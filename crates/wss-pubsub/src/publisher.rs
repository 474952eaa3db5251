//! Outbound publishing of replies to the coordinator's return topic

use crate::address::ReturnAddress;
use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use wss_core::{PubSubConfig, PublishError};

/// Sends one message to a topic.
///
/// A publish must complete (or fail) before the invocation that triggered it
/// finishes. Retries are left to the implementation's transport.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `data` with `attributes`, returning the broker's message id
    async fn publish(
        &self,
        address: &ReturnAddress,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<String, PublishError>;
}

#[async_trait]
impl<T: Publisher + ?Sized> Publisher for Arc<T> {
    async fn publish(
        &self,
        address: &ReturnAddress,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<String, PublishError> {
        (**self).publish(address, data, attributes).await
    }
}

#[derive(Debug, Serialize)]
struct PublishRequest {
    messages: Vec<OutboundMessage>,
}

#[derive(Debug, Serialize)]
struct OutboundMessage {
    data: String,
    attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Publisher speaking the Pub/Sub REST API
#[derive(Debug, Clone)]
pub struct RestPublisher {
    client: reqwest::Client,
    access_token: Option<String>,
}

impl RestPublisher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            access_token: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PublishError::transport)?;
        Ok(Self::new(client))
    }

    pub fn from_config(config: &PubSubConfig) -> Result<Self, PublishError> {
        let mut publisher = Self::with_timeout(config.request_timeout())?;
        publisher.access_token = config.access_token.clone();
        Ok(publisher)
    }

    /// Bearer token sent with every publish
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[async_trait]
impl Publisher for RestPublisher {
    async fn publish(
        &self,
        address: &ReturnAddress,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<String, PublishError> {
        let url = address.publish_url();
        let body = PublishRequest {
            messages: vec![OutboundMessage {
                data: BASE64_STANDARD.encode(data),
                attributes,
            }],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(PublishError::transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: PublishResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        let message_id = reply
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::InvalidResponse("no message id returned".to_string()))?;

        debug!(url = %url, message_id = %message_id, "Published message");
        Ok(message_id)
    }
}
