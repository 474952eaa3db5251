//! Per-invocation attributes extracted from transport metadata
//!
//! Both transports carry logical attributes under keys starting with
//! [`ATTRIBUTE_PREFIX`], but spell them differently:
//!
//! - HTTP: any `x-wss-attrib-*` header (name matched case-insensitively)
//!   whose value is itself `name:value`. Both halves are kept verbatim,
//!   surrounding whitespace included.
//! - Pub/sub: an attribute whose key starts with the prefix (matched exactly);
//!   the logical name is the last `-` or `:` separated segment of the key.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use wss_core::protocol::{ATTRIBUTE_PREFIX, CLUB_ATTRIBUTE, CORRELATION_ID, SESSION_ATTRIBUTE};

/// Logical attributes of one invocation. Never outlives it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(HashMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert, overwriting any earlier value for the same name
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get(SESSION_ATTRIBUTE)
    }

    pub fn club_id(&self) -> Option<&str> {
        self.get(CLUB_ATTRIBUTE)
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parse HTTP-style `(header name, header value)` pairs.
///
/// Values without a `:` carry no logical name and are skipped.
pub fn parse_header_pairs<'a, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut attributes = Attributes::new();
    for (name, value) in pairs {
        if !has_prefix_ignore_case(name, ATTRIBUTE_PREFIX) {
            continue;
        }
        match value.split_once(':') {
            Some((key, value)) if !key.is_empty() => {
                attributes.insert(key, value);
            }
            _ => debug!(header = name, "Attribute header value is not `name:value`, skipping"),
        }
    }
    attributes
}

/// Parse HTTP request headers
pub fn from_headers(headers: &HeaderMap) -> Attributes {
    parse_header_pairs(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value))),
    )
}

/// Parse pub/sub message attributes
pub fn from_message_attributes<'a, I>(attributes: I) -> Attributes
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut parsed = Attributes::new();
    for (key, value) in attributes {
        if !key.starts_with(ATTRIBUTE_PREFIX) {
            continue;
        }
        let name = key.rsplit(['-', ':']).next().unwrap_or_default();
        if name.is_empty() {
            debug!(attribute = %key, "Attribute key has an empty logical name, skipping");
            continue;
        }
        parsed.insert(name, value.as_str());
    }
    parsed
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Raw transport metadata a dispatch context can be built from.
pub trait MetadataSource {
    /// Look up a single metadata entry by its wire name
    fn lookup(&self, key: &str) -> Option<String>;

    /// Extract the logical attributes
    fn attributes(&self) -> Attributes;

    /// Correlation id; present only for event-mode traffic
    fn correlation_id(&self) -> Option<String> {
        self.lookup(CORRELATION_ID).filter(|id| !id.is_empty())
    }
}

impl MetadataSource for HeaderMap {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn attributes(&self) -> Attributes {
        from_headers(self)
    }
}

impl MetadataSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }

    fn attributes(&self) -> Attributes {
        from_message_attributes(self.iter())
    }
}
