//! Common test utilities for the plugin host tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use wss_core::AppConfig;
use wss_pubsub::{PublishError, Publisher, ReturnAddress};

/// Path to the shipped sample configuration
pub fn sample_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("plugin.yaml")
}

pub fn load_config(pubsub_enabled: bool) -> AppConfig {
    let mut config = AppConfig::from_file(sample_config_path()).expect("sample config loads");
    config.pubsub.enabled = pubsub_enabled;
    config
}

/// Records published messages as `(address, decoded body, attributes)`
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    pub sent: Mutex<Vec<(String, Value, HashMap<String, String>)>>,
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(
        &self,
        address: &ReturnAddress,
        data: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<String, PublishError> {
        let body = serde_json::from_slice(&data).unwrap_or(Value::Null);
        let mut sent = self.sent.lock();
        sent.push((address.to_string(), body, attributes));
        Ok(sent.len().to_string())
    }
}

pub fn router(pubsub_enabled: bool) -> (Router, Arc<MemoryPublisher>) {
    let publisher = Arc::new(MemoryPublisher::default());
    let app = wss_plugin::app_router(&load_config(pubsub_enabled), publisher.clone());
    (app, publisher)
}

pub fn json_request(uri: &str, body: &Value, correlation_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(id) = correlation_id {
        builder = builder.header("x-wss-correlation-id", id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
