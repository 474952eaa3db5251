//! WSS Plugin API
//!
//! Plugin-side dispatch building blocks shared by the HTTP and pub/sub adapters.

pub mod attributes;
pub mod capture;
pub mod context;
pub mod dispatch;
pub mod logger;
pub mod metadata;
pub mod negotiate;

pub use attributes::{Attributes, MetadataSource};
pub use capture::{catch_panic, guard};
pub use context::{ContextBuilder, DispatchContext};
pub use dispatch::OutboundDispatcher;
pub use logger::InvocationLogger;
pub use metadata::PluginDescriptor;
pub use negotiate::{is_manifest_request, negotiate, Negotiation};

// Re-export core types that handlers interact with
pub use wss_core::{HandlerError, LoggingConfig, WssError};
pub use wss_envelope::{Event, HandlerLocator, Manifest};
