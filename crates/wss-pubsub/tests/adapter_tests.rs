//! Integration tests for the pub/sub adapter
//!
//! Covers:
//! - Event replies published to the return topic with correlation metadata
//! - Handler failures and panics folded into the published event
//! - Manifest negotiation
//! - Protocol violations aborting before the handler runs
//! - Pass-through traffic and swallowed publish failures

mod common;

use common::{adapter, event_message, manifest, meta, Behavior, RecordingPublisher, TestHandler, RETURN_TOPIC};
use serde_json::json;
use wss_pubsub::{Delivery, Outcome, PubSubMessage, WssError};

fn query_body() -> serde_json::Value {
    json!({
        "event": {"name": "payment.PAYMENT_QUERY", "action": "token"},
        "pluginVersion": "1.0"
    })
}

// ============================================================================
// Event Mode
// ============================================================================

#[tokio::test]
async fn test_event_reply_is_published() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(query_body());
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    match outcome {
        Outcome::Event { delivery: Delivery::Published(id), handler_failed } => {
            assert_eq!(id, "msg-1");
            assert!(!handler_failed);
        }
        other => panic!("expected published event, got {:?}", other),
    }
    assert_eq!(handler.calls(), 1);

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].address.to_string(), RETURN_TOPIC);
    assert_eq!(published[0].attribute("x-wss-correlation-id"), Some("1234"));
    assert_eq!(published[0].attribute("x-wss-version"), Some("1.0"));

    let body = published[0].body();
    assert_eq!(body["event"]["action"], "token");
    assert_eq!(body["event"]["errors"], json!([]));
    assert_eq!(body["event"]["handled"], true);
    assert_eq!(body["event"]["session"], "s-1");
}

#[tokio::test]
async fn test_handler_error_is_published_on_event() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Fail);

    let body = json!({
        "event": {"name": "payment.PAYMENT_QUERY", "errors": ["upstream: timeout"]}
    });
    let message = event_message(body);
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    assert!(matches!(outcome, Outcome::Event { handler_failed: true, .. }));

    let body = publisher.published()[0].body();
    let errors = body["event"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "upstream: timeout");
    assert!(errors[1].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_handler_panic_is_published_on_event() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Panic);

    let message = event_message(query_body());
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    assert!(matches!(outcome, Outcome::Event { handler_failed: true, .. }));
    let body = publisher.published()[0].body();
    assert!(body["event"]["errors"][0].as_str().unwrap().contains("cannot settle"));
}

#[tokio::test]
async fn test_publish_failure_is_swallowed() {
    let publisher = RecordingPublisher::rejecting();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(query_body());
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    match outcome.delivery() {
        Some(Delivery::Failed(err)) => assert!(err.to_string().contains("503")),
        other => panic!("expected failed delivery, got {:?}", other),
    }
    assert_eq!(publisher.published().len(), 1);
}

// ============================================================================
// Manifest Negotiation
// ============================================================================

#[tokio::test]
async fn test_manifest_request_publishes_manifest() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(json!({"event": {"name": "system.MANIFEST"}}));
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    assert!(matches!(outcome, Outcome::Manifest(Delivery::Published(_))));
    assert_eq!(handler.calls(), 0);

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].attribute("x-wss-correlation-id"), Some("1234"));
    assert_eq!(published[0].attribute("x-wss-version"), Some("1.0"));
    assert_eq!(published[0].body()["event"], serde_json::to_value(manifest()).unwrap());
}

#[tokio::test]
async fn test_manifest_publish_failure_is_swallowed() {
    let publisher = RecordingPublisher::rejecting();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(json!({"event": {"name": "system.MANIFEST"}}));
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    assert!(matches!(outcome, Outcome::Manifest(Delivery::Failed(_))));
    assert_eq!(handler.calls(), 0);
}

// ============================================================================
// Protocol Violations
// ============================================================================

#[tokio::test]
async fn test_missing_return_topic_aborts_before_handler() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let mut message = event_message(query_body());
    message.attributes.remove("x-wss-return-topic");
    let result = adapter.handle(&handler, message.clone(), meta(&message)).await;

    assert!(matches!(result, Err(WssError::MissingReturnTopic { ref correlation_id }) if correlation_id == "1234"));
    assert_eq!(handler.calls(), 0);
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_invalid_return_topic_aborts_before_handler() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(query_body()).with_attribute("x-wss-return-topic", "replies");
    let result = adapter.handle(&handler, message.clone(), meta(&message)).await;

    assert!(matches!(result, Err(WssError::InvalidReturnTopic { .. })));
    assert_eq!(handler.calls(), 0);
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_missing_event_is_rejected() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = event_message(json!({"pluginVersion": "1.0"}));
    let result = adapter.handle(&handler, message.clone(), meta(&message)).await;

    assert!(matches!(result, Err(WssError::MissingEvent)));
    assert_eq!(handler.calls(), 0);
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_undecodable_data_is_rejected_in_event_mode() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let mut message = event_message(query_body());
    message.data = "not json".into();
    let result = adapter.handle(&handler, message.clone(), meta(&message)).await;

    assert!(matches!(result, Err(WssError::Decode(_))));
    assert_eq!(handler.calls(), 0);
}

// ============================================================================
// Pass-through Mode
// ============================================================================

#[tokio::test]
async fn test_pass_through_returns_handler_output() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Echo);

    let message = PubSubMessage::new("plain text, not an envelope");
    let outcome = adapter.handle(&handler, message.clone(), meta(&message)).await.unwrap();

    match outcome {
        Outcome::PassThrough(output) => assert_eq!(output, "plain text, not an envelope"),
        other => panic!("expected pass-through, got {:?}", other),
    }
    assert_eq!(handler.calls(), 1);
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_pass_through_handler_error_is_returned() {
    let publisher = RecordingPublisher::new();
    let adapter = adapter(publisher.clone());
    let handler = TestHandler::new(Behavior::Fail);

    let message = PubSubMessage::json(&query_body());
    let result = adapter.handle(&handler, message.clone(), meta(&message)).await;

    assert!(matches!(result, Err(WssError::Handler(_))));
    assert!(publisher.published().is_empty());
}
