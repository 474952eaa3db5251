//! Wire names shared by every transport.
//!
//! Header and attribute names are lowercase; HTTP matches them
//! case-insensitively, pub/sub attributes match them exactly.

pub use wss_envelope::{ENVELOPE_KEY, PLUGIN_VERSION_KEY};

/// Presence marks event mode; echoed on the response
pub const CORRELATION_ID: &str = "x-wss-correlation-id";

/// Manifest version echoed on every event-mode response
pub const VERSION: &str = "x-wss-version";

/// Prefix of keys carrying one logical attribute each
pub const ATTRIBUTE_PREFIX: &str = "x-wss-attrib-";

/// Pub/sub only: `apiEndpoint/projectId/topic` to publish the reply to
pub const RETURN_TOPIC: &str = "x-wss-return-topic";

/// Reserved event name answered with the plugin manifest
pub const MANIFEST_EVENT: &str = "system.MANIFEST";

/// Attribute naming the caller's session, bound to the invocation logger
pub const SESSION_ATTRIBUTE: &str = "sessionId";

/// Attribute naming the caller's club, bound to the invocation logger
pub const CLUB_ATTRIBUTE: &str = "clubId";

pub const NO_SESSION: &str = "noContext";
pub const NO_CLUB: &str = "noClub";

/// True when `name` is shaped like `<subsystem>.<ACTION>`
pub fn is_event_name(name: &str) -> bool {
    matches!(name.split_once('.'), Some((subsystem, action)) if !subsystem.is_empty() && !action.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_shape() {
        assert!(is_event_name("payment.PAYMENT_QUERY"));
        assert!(is_event_name(MANIFEST_EVENT));
        assert!(!is_event_name("payment"));
        assert!(!is_event_name(".QUERY"));
        assert!(!is_event_name("payment."));
    }
}
