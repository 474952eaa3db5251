//! Shared helpers for the event middleware tests

use axum::{
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;
use wss_plugin_api::Manifest;

pub fn manifest() -> Manifest {
    Manifest::new("payments", "payment", "1.0")
        .with_description("Card payments")
        .subscribe("payment.PAYMENT_QUERY", "inline:onQuery")
}

/// Event-mode POST with correlation id `1234` and the `foo:bar` attribute
pub fn event_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-wss-correlation-id", "1234")
        .header("x-wss-attrib-foo", "foo:bar")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn plain_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
