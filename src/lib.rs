//! WSS plugin host: wires the echo plugin to both transports.

pub mod handlers;
pub mod telemetry;

use axum::{
    routing::{get, post},
    Router,
};
use handlers::EchoPlugin;
use tower_http::trace::TraceLayer;
use tracing::info;
use wss_core::AppConfig;
use wss_http::{health_check, with_event_layer, HttpAdapter};
use wss_pubsub::{push_router, PubSubAdapter, Publisher, RestPublisher};

/// Full application router, publishing pub/sub replies over REST
pub fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let publisher = RestPublisher::from_config(&config.pubsub)?;
    Ok(app_router(config, publisher))
}

/// Application router with a caller-supplied publisher
pub fn app_router<P: Publisher + 'static>(config: &AppConfig, publisher: P) -> Router {
    let plugin = EchoPlugin::new(config.manifest.name.as_str());

    let events = Router::new()
        .route(&config.http.event_path, post(handlers::handle_event))
        .with_state(plugin.clone());

    let mut app = with_event_layer(events, HttpAdapter::from_config(config))
        .route(&config.http.health_path, get(health_check));

    if config.pubsub.enabled {
        info!(path = %config.pubsub.push_path, "Pub/sub push endpoint enabled");
        let adapter = PubSubAdapter::from_config(config, publisher);
        app = app.merge(push_router(&config.pubsub.push_path, adapter, plugin));
    }

    app.layer(TraceLayer::new_for_http())
}
