//! # WSS Core
//!
//! Shared building blocks for WSS plugins:
//!
//! - **Protocol**: header/attribute names, the reserved manifest event name
//!   and the logger fallback sentinels.
//! - **Errors**: the dispatch error taxonomy using `thiserror`, separating
//!   protocol-contract failures from handler and publish failures.
//! - **Configuration**: manifest, logging and transport settings loaded from
//!   YAML with environment overrides.
//!
//! ## Example
//!
//! ```
//! use wss_core::config::AppConfig;
//!
//! let config = AppConfig::from_yaml(r#"
//! manifest:
//!   name: payments
//!   subsystem: payment
//!   version: "1.0"
//! "#).unwrap();
//!
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod protocol;

// Re-export commonly used types for convenience
pub use config::{AppConfig, HttpConfig, LogFormat, LoggingConfig, PubSubConfig};
pub use error::{ConfigError, HandlerError, PublishError, Result, WssError};
pub use wss_envelope::{Event, HandlerLocator, Manifest};
