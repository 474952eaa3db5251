//! Plugin manifest and subscription locators

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const INLINE_PREFIX: &str = "inline:";

/// Where the handler for a subscribed event lives.
///
/// On the wire this is a plain string; the variant is inferred from its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HandlerLocator {
    /// Local path, resolved by the plugin host
    Path(String),
    /// Remote `http(s)://` address
    Remote(String),
    /// Reference to a callback registered in-process (`inline:<ref>`)
    Inline(String),
}

impl HandlerLocator {
    pub fn as_str(&self) -> &str {
        match self {
            HandlerLocator::Path(s) | HandlerLocator::Remote(s) | HandlerLocator::Inline(s) => s,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, HandlerLocator::Remote(_))
    }
}

impl From<String> for HandlerLocator {
    fn from(value: String) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            HandlerLocator::Remote(value)
        } else if let Some(reference) = value.strip_prefix(INLINE_PREFIX) {
            HandlerLocator::Inline(reference.to_string())
        } else {
            HandlerLocator::Path(value)
        }
    }
}

impl From<&str> for HandlerLocator {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<HandlerLocator> for String {
    fn from(locator: HandlerLocator) -> Self {
        match locator {
            HandlerLocator::Inline(reference) => format!("{INLINE_PREFIX}{reference}"),
            HandlerLocator::Path(s) | HandlerLocator::Remote(s) => s,
        }
    }
}

impl fmt::Display for HandlerLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerLocator::Inline(reference) => write!(f, "{INLINE_PREFIX}{reference}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Static description of a plugin, returned to the coordinator on a
/// manifest request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub manifest_version: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub subsystem: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: String,

    /// Event name to handler locator
    #[serde(default)]
    pub subscriptions: HashMap<String, HandlerLocator>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, subsystem: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            manifest_version: "1".to_string(),
            name: name.into(),
            subsystem: subsystem.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add or replace a subscription
    pub fn subscribe(mut self, event: impl Into<String>, locator: impl Into<HandlerLocator>) -> Self {
        self.subscriptions.insert(event.into(), locator.into());
        self
    }

    pub fn handler_for(&self, event: &str) -> Option<&HandlerLocator> {
        self.subscriptions.get(event)
    }
}
