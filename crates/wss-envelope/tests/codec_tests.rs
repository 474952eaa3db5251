//! Envelope codec behaviour as seen by transports

use serde_json::{json, Value};
use wss_envelope::{decode, encode_event, encode_manifest, open, parse_payload, Event, Manifest};

#[test]
fn test_round_trip_preserves_domain_fields() {
    let raw = br#"{
        "event": {
            "name": "payment.PAYMENT_QUERY",
            "errors": ["earlier failure"],
            "action": "token",
            "amount": {"value": 1200, "currency": "EUR"}
        },
        "pluginVersion": "1.0"
    }"#;

    let event = decode(raw).expect("Failed to decode envelope");
    assert_eq!(event.name(), "payment.PAYMENT_QUERY");
    assert_eq!(event.errors(), ["earlier failure"]);
    assert!(!event.is_propagation_stopped());
    assert_eq!(event.get("amount").unwrap()["currency"], "EUR");

    let encoded = encode_event(&event).expect("Failed to encode event");
    assert_eq!(decode(&encoded).unwrap(), event);
}

#[test]
fn test_stop_propagation_survives_encoding_as_data() {
    let mut event = decode(br#"{"event": {"name": "club.MEMBER_JOINED"}}"#).unwrap();
    event.stop_propagation();

    let value: Value = serde_json::from_slice(&encode_event(&event).unwrap()).unwrap();
    assert_eq!(value["event"]["isPropagationStopped"], true);

    let decoded = decode(&serde_json::to_vec(&value).unwrap()).unwrap();
    assert!(decoded.is_propagation_stopped());
}

#[test]
fn test_handler_mutations_are_encoded() {
    let mut event = decode(br#"{"event": {"name": "payment.PAYMENT_QUERY"}}"#).unwrap();
    event.insert("status", "settled");
    event.push_error("warning: slow upstream");

    let value: Value = serde_json::from_slice(&encode_event(&event).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "event": {
                "name": "payment.PAYMENT_QUERY",
                "errors": ["warning: slow upstream"],
                "isPropagationStopped": false,
                "status": "settled"
            }
        })
    );
}

#[test]
fn test_manifest_is_wrapped_like_an_event() {
    let manifest = Manifest::new("payments", "payment", "2.3.0")
        .subscribe("payment.PAYMENT_QUERY", "https://plugins.example.com/query");

    let value: Value = serde_json::from_slice(&encode_manifest(&manifest).unwrap()).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 1);

    let back: Manifest = serde_json::from_value(value["event"].clone()).unwrap();
    assert_eq!(back, manifest);
}

#[test]
fn test_open_keeps_unknown_body_fields() {
    let payload = parse_payload(br#"{"event": {"name": "a.B"}, "pluginVersion": 2, "trace": "x"}"#)
        .unwrap();
    let envelope = open(&payload).unwrap();

    assert_eq!(envelope.event, Some(Event::new("a.B")));
    assert_eq!(envelope.plugin_version.as_deref(), Some("2"));
    assert_eq!(envelope.extra.len(), 1);
}
