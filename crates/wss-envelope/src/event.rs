//! Event type carried inside the envelope

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque domain fields carried next to the fixed event fields.
pub type Payload = Map<String, Value>;

/// Field names owned by [`Event`] itself; never stored in the payload.
pub const RESERVED_FIELDS: [&str; 3] = ["name", "errors", "isPropagationStopped"];

/// The unit dispatched to and returned from a plugin handler.
///
/// `name` is fixed at construction, `errors` only grows and propagation can
/// only be stopped, never resumed. Everything else travels in [`Payload`]
/// untouched; handlers interpret it by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    name: String,

    #[serde(default)]
    errors: Vec<String>,

    #[serde(default)]
    is_propagation_stopped: bool,

    #[serde(flatten)]
    payload: Payload,
}

impl Event {
    /// Create an event with an empty payload
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_payload(name, Payload::new())
    }

    /// Create an event carrying `payload`; reserved keys are dropped
    pub fn with_payload(name: impl Into<String>, mut payload: Payload) -> Self {
        for field in RESERVED_FIELDS {
            payload.remove(field);
        }

        Self {
            name: name.into(),
            errors: Vec::new(),
            is_propagation_stopped: false,
            payload,
        }
    }

    /// Full event name, `<subsystem>.<ACTION>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Part of the name before the first `.`
    pub fn subsystem(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(subsystem, _)| subsystem)
            .unwrap_or(&self.name)
    }

    /// Part of the name after the first `.`, if any
    pub fn action(&self) -> Option<&str> {
        self.name.split_once('.').map(|(_, action)| action)
    }

    /// Diagnostics accumulated so far, oldest first
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Append a diagnostic. Earlier entries are never touched.
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.is_propagation_stopped
    }

    /// Tell downstream coordinators not to route this event any further.
    ///
    /// Idempotent; there is no way to resume propagation.
    pub fn stop_propagation(&mut self) {
        self.is_propagation_stopped = true;
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Look up a single domain field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Set a domain field, returning the previous value.
    ///
    /// Reserved field names are ignored so the fixed fields cannot be
    /// shadowed on the wire.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if RESERVED_FIELDS.contains(&key.as_str()) {
            return None;
        }
        self.payload.insert(key, value.into())
    }

    /// Remove a domain field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.payload.remove(key)
    }

    /// Decode the domain payload into an integrator-defined type
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.payload.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_parts() {
        let event = Event::new("payment.PAYMENT_QUERY");
        assert_eq!(event.subsystem(), "payment");
        assert_eq!(event.action(), Some("PAYMENT_QUERY"));

        let bare = Event::new("heartbeat");
        assert_eq!(bare.subsystem(), "heartbeat");
        assert_eq!(bare.action(), None);
    }

    #[test]
    fn test_stop_propagation_is_idempotent() {
        let mut event = Event::new("payment.PAYMENT_QUERY");
        assert!(!event.is_propagation_stopped());

        event.stop_propagation();
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn test_errors_append_in_order() {
        let mut event = Event::new("payment.PAYMENT_QUERY");
        event.push_error("first");
        event.push_error("second");
        assert_eq!(event.errors(), ["first", "second"]);
        assert!(event.has_errors());
    }

    #[test]
    fn test_insert_ignores_reserved_fields() {
        let mut event = Event::new("payment.PAYMENT_QUERY");
        assert_eq!(event.insert("name", "other"), None);
        assert_eq!(event.insert("errors", json!([])), None);
        assert_eq!(event.name(), "payment.PAYMENT_QUERY");
        assert!(event.payload().is_empty());

        event.insert("action", "token");
        assert_eq!(event.get("action"), Some(&json!("token")));
    }

    #[test]
    fn test_with_payload_strips_reserved_fields() {
        let payload = json!({"name": "spoofed", "amount": 12})
            .as_object()
            .cloned()
            .unwrap();
        let event = Event::with_payload("payment.CHARGE", payload);

        assert_eq!(event.name(), "payment.CHARGE");
        assert_eq!(event.payload().len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut event = Event::new("payment.PAYMENT_QUERY");
        event.insert("action", "token");
        event.stop_propagation();

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "payment.PAYMENT_QUERY",
                "errors": [],
                "isPropagationStopped": true,
                "action": "token"
            })
        );
    }

    #[test]
    fn test_payload_as_typed() {
        #[derive(Deserialize)]
        struct Query {
            action: String,
            amount: u32,
        }

        let mut event = Event::new("payment.PAYMENT_QUERY");
        event.insert("action", "token");
        event.insert("amount", 42);

        let query: Query = event.payload_as().unwrap();
        assert_eq!(query.action, "token");
        assert_eq!(query.amount, 42);
    }
}
