//! WSS HTTP - envelope protocol middleware for axum
//!
//! Install the event layer in front of plugin routes. Requests carrying an
//! `x-wss-correlation-id` header are treated as coordinator events: the body
//! is decoded into a [`DispatchContext`](wss_plugin_api::DispatchContext),
//! manifest requests are answered directly, and the event as the handler left
//! it is encoded into the envelope reply. A handler that needs to send its own
//! response wraps it in [`OwnResponse`]. Everything else passes through.
//!
//! # Example
//!
//! ```no_run
//! use axum::{routing::post, Router};
//! use wss_http::{with_event_layer, EnvelopeReply, HandlerRejection, HttpAdapter, WssContext};
//! use wss_plugin_api::{LoggingConfig, Manifest};
//!
//! async fn query(ctx: WssContext) -> Result<EnvelopeReply, HandlerRejection> {
//!     ctx.with(|ctx| {
//!         if let Some(event) = ctx.event_mut() {
//!             event.insert("status", "settled");
//!         }
//!     });
//!     Ok(EnvelopeReply)
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manifest = Manifest::new("payments", "payment", "1.0");
//!     let adapter = HttpAdapter::new(&manifest, LoggingConfig::default());
//!     let app = with_event_layer(Router::new().route("/", post(query)), adapter);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod extract;
pub mod middleware;
pub mod types;

pub use extract::{CapturedFailure, EnvelopeReply, HandlerRejection, OwnResponse, WssContext};
pub use middleware::{event_middleware, health_check};
pub use types::{ApiError, ErrorResponse};

use axum::Router;
use std::sync::Arc;
use wss_core::{AppConfig, LoggingConfig};
use wss_envelope::Manifest;
use wss_plugin_api::{ContextBuilder, PluginDescriptor};

const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Read-only state shared by every request through the event layer
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    contexts: ContextBuilder,
    body_limit: usize,
}

impl HttpAdapter {
    pub fn new<P: PluginDescriptor + ?Sized>(plugin: &P, logging: LoggingConfig) -> Self {
        Self {
            contexts: ContextBuilder::for_plugin(plugin, logging),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.manifest, config.logging.clone())
            .with_body_limit(config.http.body_limit_bytes)
    }

    /// Largest body read into memory before decoding
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn contexts(&self) -> &ContextBuilder {
        &self.contexts
    }

    pub fn manifest(&self) -> &Manifest {
        self.contexts.manifest()
    }
}

/// Put every route of `router` behind the event middleware
pub fn with_event_layer<S>(router: Router<S>, adapter: HttpAdapter) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(
        Arc::new(adapter),
        event_middleware,
    ))
}
