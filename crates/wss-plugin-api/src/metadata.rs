use std::collections::HashMap;
use wss_envelope::{HandlerLocator, Manifest};

/// What a plugin says about itself.
///
/// Implemented per plugin; the manifest served to the coordinator is derived
/// from it. A [`Manifest`] loaded from configuration is itself a descriptor.
pub trait PluginDescriptor: Send + Sync {
    fn name(&self) -> &str;

    /// Subsystem prefix of the events this plugin handles
    fn subsystem(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn manifest_version(&self) -> &str {
        "1"
    }

    /// Event name to handler locator
    fn subscriptions(&self) -> HashMap<String, HandlerLocator>;

    fn manifest(&self) -> Manifest {
        Manifest {
            manifest_version: self.manifest_version().to_string(),
            name: self.name().to_string(),
            subsystem: self.subsystem().to_string(),
            description: self.description().to_string(),
            version: self.version().to_string(),
            subscriptions: self.subscriptions(),
        }
    }
}

impl PluginDescriptor for Manifest {
    fn name(&self) -> &str {
        &self.name
    }

    fn subsystem(&self) -> &str {
        &self.subsystem
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn manifest_version(&self) -> &str {
        &self.manifest_version
    }

    fn subscriptions(&self) -> HashMap<String, HandlerLocator> {
        self.subscriptions.clone()
    }

    fn manifest(&self) -> Manifest {
        self.clone()
    }
}
