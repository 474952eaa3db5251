//! Configuration for a WSS plugin process.
//!
//! This module provides a configuration system that supports:
//! - Loading from YAML files
//! - Environment variable overrides (`WSS__SECTION__FIELD`)
//! - Validation of the manifest and logging settings

use crate::error::{ConfigError, Result};
use crate::protocol::is_event_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::Level;
use wss_envelope::Manifest;

/// Root configuration of a plugin process.
///
/// # Examples
///
/// ```no_run
/// use wss_core::config::AppConfig;
///
/// let config = AppConfig::from_file("plugin.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Manifest served on `system.MANIFEST` requests
    #[serde(default)]
    pub manifest: Manifest,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Pub/sub transport configuration
    #[serde(default)]
    pub pubsub: PubSubConfig,
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate: the YAML file first,
    /// then `WSS__*` environment variables on top.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix("WSS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut app: Self = config.clone().try_deserialize().map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })?;
        app.manifest = manifest_with_overrides(path, &config)?;
        Ok(app)
    }

    /// Validates the configuration.
    ///
    /// Checks for:
    /// - A named, versioned manifest
    /// - Subscription keys shaped like `<subsystem>.<ACTION>`
    /// - A parsable log level and bind address
    pub fn validate(&self) -> Result<()> {
        if self.manifest.name.is_empty() {
            return Err(ConfigError::missing_field("manifest.name").into());
        }
        if self.manifest.version.is_empty() {
            return Err(ConfigError::missing_field("manifest.version").into());
        }
        for event in self.manifest.subscriptions.keys() {
            if !is_event_name(event) {
                return Err(ConfigError::invalid_value(
                    "manifest.subscriptions",
                    format!("'{}' is not of the form <subsystem>.<ACTION>", event),
                )
                .into());
            }
        }

        self.logging.parse_level()?;
        self.http.socket_addr()?;

        Ok(())
    }
}

/// The `config` crate folds every key to lowercase, which breaks
/// `manifestVersion` and the case-sensitive subscription keys. The manifest
/// is therefore read from the file as written, and only its scalar fields
/// take overrides from the merged sources.
fn manifest_with_overrides(path: &Path, config: &config::Config) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let root: serde_yaml::Value =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })?;

    let mut manifest = match root.get("manifest") {
        Some(value) => Manifest::deserialize(value).map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })?,
        None => Manifest::default(),
    };

    let fields = [
        ("manifest.manifestversion", &mut manifest.manifest_version),
        ("manifest.name", &mut manifest.name),
        ("manifest.subsystem", &mut manifest.subsystem),
        ("manifest.description", &mut manifest.description),
        ("manifest.version", &mut manifest.version),
    ];
    for (key, field) in fields {
        if let Ok(value) = config.get_string(key) {
            *field = value;
        }
    }

    Ok(manifest)
}

/// Logging configuration.
///
/// Passed explicitly into every dispatch context; nothing reads it from
/// global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Whether to include file/line info
    #[serde(default)]
    pub file_line: bool,

    /// Per-module log levels
    #[serde(default)]
    pub module_levels: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
            file_line: false,
            module_levels: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }

    /// Level threshold, falling back to INFO on an unparsable value
    pub fn threshold(&self) -> Level {
        self.parse_level().unwrap_or(Level::INFO)
    }

    /// `EnvFilter` directives: the global level followed by per-module ones
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort();

        let mut directives = self.level.clone();
        for (module, level) in modules {
            directives.push_str(&format!(",{}={}", module, level));
        }
        directives
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest request body read into memory
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Route receiving coordinator events
    #[serde(default = "default_event_path")]
    pub event_path: String,

    /// Liveness route
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

fn default_event_path() -> String {
    "/".to_string()
}

fn default_health_path() -> String {
    "/healthz".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            body_limit_bytes: default_body_limit(),
            event_path: default_event_path(),
            health_path: default_health_path(),
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "http.bind_addr",
                format!("'{}' is not a socket address", self.bind_addr),
            )
            .into()
        })
    }
}

/// Pub/sub transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubConfig {
    /// Whether the push-subscription endpoint is mounted
    #[serde(default)]
    pub enabled: bool,

    /// Route receiving push deliveries
    #[serde(default = "default_push_path")]
    pub push_path: String,

    /// Bearer token attached to outbound publishes
    #[serde(default)]
    pub access_token: Option<String>,

    /// Timeout for a single outbound publish
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_push_path() -> String {
    "/pubsub/push".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            push_path: default_push_path(),
            access_token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl PubSubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
