use tracing::debug;
use wss_envelope::Event;

/// Outbound hook for emitting further events from a handler.
///
/// Accepts an event and currently has no observable effect: no transport is
/// wired behind it yet.
// TODO: route outbound events through the pub/sub publisher once the
// coordinator defines a topic for plugin-originated events.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutboundDispatcher;

impl OutboundDispatcher {
    pub fn dispatch(&self, event: Event) {
        debug!(
            event = event.name(),
            "Outbound dispatch is not wired to a transport, dropping event"
        );
    }
}
