//! HTTP surface for the tracker: announce API, health, and metrics.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Extension, Router};
use eyre::Result as EyreResult;
use muster_tracker::Tracker;
use prometheus_client::registry::Registry;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::metrics::TrackerMetrics;

pub mod api;
pub mod config;
mod handlers;
mod metrics;

#[cfg(test)]
#[path = "tests/service.rs"]
mod tests;

pub struct ServiceState {
    pub(crate) tracker: Tracker,
    pub(crate) metrics: TrackerMetrics,
}

pub async fn start(config: ServerConfig, tracker: Tracker) -> EyreResult<()> {
    let mut registry = Registry::default();
    let metrics = TrackerMetrics::new(&mut registry);

    let state = Arc::new(ServiceState { tracker, metrics });
    let app = app(state, registry);

    let listener = TcpListener::bind(config.listen).await?;
    info!("Listening on '\x1b[1;33mhttp://{}\x1b[0m'", config.listen);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn app(state: Arc<ServiceState>, registry: Registry) -> Router {
    let api = Router::new()
        .route("/v1/announce", post(handlers::announce_handler))
        .route("/v1/deannounce", post(handlers::deannounce_handler))
        .route("/v1/info", get(handlers::info_handler))
        .layer(from_fn(metrics::track_client));

    let (metrics_path, metrics_router) = metrics::service(registry);

    // The state extension is layered last so it wraps everything,
    // including the client tracking middleware.
    Router::new()
        .merge(api)
        .route("/health", get(handlers::health_check_handler))
        .nest(metrics_path, metrics_router)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, shutting down");
}
