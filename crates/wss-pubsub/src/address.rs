//! Return addresses for event-mode replies
//!
//! The coordinator names where a reply goes with a single attribute of the
//! form `apiEndpoint/projectId/topic`. The endpoint may itself contain `/`
//! (a scheme, a path prefix), so the value is split from the right.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use wss_core::protocol::RETURN_TOPIC;
use wss_core::WssError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReturnAddress {
    endpoint: String,
    project: String,
    topic: String,
}

impl ReturnAddress {
    pub fn new(
        endpoint: impl Into<String>,
        project: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            project: project.into(),
            topic: topic.into(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, WssError> {
        let invalid = |reason: &str| WssError::InvalidReturnTopic {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = value.rsplitn(3, '/');
        let topic = parts.next().unwrap_or_default();
        let (Some(project), Some(endpoint)) = (parts.next(), parts.next()) else {
            return Err(invalid("expected apiEndpoint/projectId/topic"));
        };

        if endpoint.is_empty() {
            return Err(invalid("api endpoint is empty"));
        }
        if project.is_empty() {
            return Err(invalid("project id is empty"));
        }
        if topic.is_empty() {
            return Err(invalid("topic is empty"));
        }

        Ok(Self::new(endpoint, project, topic))
    }

    /// Read the return address of an event-mode message
    pub fn from_attributes(
        attributes: &HashMap<String, String>,
        correlation_id: &str,
    ) -> Result<Self, WssError> {
        match attributes.get(RETURN_TOPIC).filter(|value| !value.is_empty()) {
            Some(value) => Self::parse(value),
            None => Err(WssError::MissingReturnTopic {
                correlation_id: correlation_id.to_string(),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// REST publish URL; endpoints given without a scheme use https
    pub fn publish_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        let base = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        format!(
            "{}/v1/projects/{}/topics/{}:publish",
            base, self.project, self.topic
        )
    }
}

impl fmt::Display for ReturnAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.endpoint, self.project, self.topic)
    }
}

impl FromStr for ReturnAddress {
    type Err = WssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
