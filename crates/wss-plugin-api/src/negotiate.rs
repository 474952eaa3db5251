//! Manifest negotiation
//!
//! A request for the reserved [`MANIFEST_EVENT`] is answered with the plugin
//! manifest instead of running the handler. Adapters check this before any
//! handler code runs.

use wss_core::protocol::MANIFEST_EVENT;
use wss_envelope::Manifest;

/// What an adapter should do with a decoded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation<'a> {
    /// Reply with this manifest; do not invoke the handler
    Manifest(&'a Manifest),
    /// Invoke the handler as usual
    Dispatch,
}

pub fn is_manifest_request(event_name: &str) -> bool {
    event_name == MANIFEST_EVENT
}

pub fn negotiate<'a>(event_name: &str, manifest: &'a Manifest) -> Negotiation<'a> {
    if is_manifest_request(event_name) {
        Negotiation::Manifest(manifest)
    } else {
        Negotiation::Dispatch
    }
}
