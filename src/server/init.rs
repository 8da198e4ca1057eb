//! Server initialization and main run loop
//!
//! Contains the main `run()` function that loads configuration, builds the
//! chat pipeline and serves the HTTP API until a shutdown signal arrives.

use super::config::{AppConfig, Credentials};
use super::loader::load_config;
use super::providers::build_chat_service;
use super::validation::validate_production_config;
use crate::middleware::rate_limit::{RateLimitLayer, RateLimitSettings};
use anyhow::{Context, Result};
use axum::{Extension, Router};
use finchat_core::ChatService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Command-line overrides for the listener
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Build the application router around a chat service
pub fn build_router(service: Arc<ChatService>, rate_limit: &RateLimitSettings) -> Router {
    let rate_limit_layer = RateLimitLayer::new(rate_limit);
    if rate_limit.enabled {
        rate_limit_layer.state().spawn_cleanup();
    }

    Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::api_router())
        .layer(Extension(service))
        .layer(rate_limit_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the server
pub async fn run(overrides: ServeOverrides) -> Result<()> {
    info!("Starting finchat v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config().context("Failed to load configuration")?;
    apply_overrides(&mut config, overrides);
    info!("Configuration loaded");

    validate_production_config(&config);

    let credentials = Credentials::from_env()?;
    let service = Arc::new(build_chat_service(&config, &credentials)?);
    info!("Chat pipeline initialized");

    let app = build_router(service, &config.server.rate_limit);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("finchat shutdown complete");
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, overrides: ServeOverrides) {
    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
