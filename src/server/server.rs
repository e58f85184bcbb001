use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::cache::credential_manager::CredentialManager;
use crate::config::settings::{ServiceConfig, SettingsConfig};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::relay::relay::Relay;
use crate::server::catalog;
use crate::utils::constants::EXAMPLE_TRACK_ID;

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(metrics: &Metrics, relay: Relay) -> Self {
        Self {
            relay,
            metrics_state: MetricsState::new(metrics.registry.clone()),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        self.relay.credentials()
    }
}

/// Catalog routes, health, optional metrics and the JSON 404 fallback.
pub fn router(state: AppState, settings_config: &SettingsConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(catalog::home))
        .route("/health", get(catalog::health))
        .route("/track/{*identifier}", get(catalog::track))
        .route("/features/{*identifier}", get(catalog::features))
        .route("/analysis/{*identifier}", get(catalog::analysis))
        .route("/complete/{*identifier}", get(catalog::complete))
        .route("/search", get(catalog::search))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .fallback(catalog::not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C / SIGTERM.
pub async fn start(service_config: &ServiceConfig, state: AppState) -> Result<()> {
    let settings_config = &service_config.settings;
    let metrics = get_metrics().await;
    let has_secrets = state.credentials().has_secrets();
    let app = router(state, settings_config);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    log_banner(service_config, &bind_addr);
    if !has_secrets {
        warn!("running without client credentials: only /, /health and metrics are functional");
    }

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);
    info!("server stopped");

    Ok(())
}

fn log_banner(service_config: &ServiceConfig, bind_addr: &str) {
    let lines = [
        format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("listening on http://{}", bind_addr),
        format!("upstream {}", service_config.upstream.api_base),
        format!("example: /features/{}", EXAMPLE_TRACK_ID),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
