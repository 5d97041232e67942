use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod auth;
mod cdmi;
mod config;
mod health;
pub mod tls;

pub use config::Config;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// How long in-flight TLS connections get to finish after shutdown is signalled
const TLS_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Which listener a router is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Plain HTTP. CDMI routes require Basic auth unless anonymous access is allowed.
    Http,
    /// Mutual TLS. The handshake already authenticated the client.
    Https,
}

/// Build the full router for one listener: status routes plus the
///  CDMI object, container and capability routes.
pub fn router(config: &Config, state: ServiceState, listener: Listener) -> Router {
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let mut cdmi_routes = Router::new()
        .route(
            "/",
            get(cdmi::get::root)
                .put(cdmi::put::root)
                .delete(cdmi::delete::root),
        )
        .route(
            "/*path",
            get(cdmi::get::handler)
                .put(cdmi::put::handler)
                .delete(cdmi::delete::handler),
        );

    if listener == Listener::Http && !state.allow_anonymous() {
        cdmi_routes = cdmi_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic,
        ));
    }

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .merge(cdmi_routes)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
        .layer(trace_layer)
}

/// Run the plain HTTP server.
pub async fn run_http(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state, Listener::Http);

    tracing::info!(addr = ?listen_addr, "HTTP server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

/// Run the mutual-TLS HTTPS server.
pub async fn run_https(
    config: Config,
    tls: Arc<rustls::ServerConfig>,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state, Listener::Https);

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        let _ = shutdown_rx.changed().await;
        shutdown_handle.graceful_shutdown(Some(TLS_SHUTDOWN_GRACE));
    });

    tracing::info!(addr = ?listen_addr, "HTTPS server listening");
    axum_server::bind_rustls(listen_addr, RustlsConfig::from_config(tls))
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
