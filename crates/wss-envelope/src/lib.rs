//! Event envelope types and codec for WSS plugins
//!
//! A coordinator and its plugins exchange JSON bodies that wrap either an
//! [`Event`] or a [`Manifest`] under a single envelope key. This crate owns
//! those types and the pure decode/encode functions around them; it knows
//! nothing about transports.
//!
//! # Example
//!
//! ```rust
//! use wss_envelope::{decode, encode_event};
//!
//! let raw = br#"{"event": {"name": "payment.PAYMENT_QUERY", "action": "token"}, "pluginVersion": "1.0"}"#;
//! let mut event = decode(raw).expect("valid envelope");
//! assert_eq!(event.action(), Some("PAYMENT_QUERY"));
//!
//! event.stop_propagation();
//! let reply = encode_event(&event).expect("encodable");
//! assert_eq!(decode(&reply).unwrap(), event);
//! ```

pub mod codec;
pub mod event;
pub mod manifest;

pub use codec::{
    decode, encode_event, encode_manifest, open, parse_payload, DecodeError, EncodeError,
    Envelope, ENVELOPE_KEY, PLUGIN_VERSION_KEY,
};
pub use event::{Event, Payload};
pub use manifest::{HandlerLocator, Manifest};
