use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(registry: prometheus::Registry) -> Self {
        Self {
            metrics_state: MetricsState::new(registry),
        }
    }
}

/// Build the router serving the configured observability paths
pub async fn router(settings_config: &SettingsConfig) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics.registry.clone());

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start one Axum server for metrics; returns immediately when nothing is routed.
pub async fn start(settings_config: &SettingsConfig) -> Result<()> {
    if !settings_config.metrics.is_enabled {
        return Ok(());
    }
    let app = router(settings_config).await;

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind metrics server on {}", bind_addr))?;
    info!("metrics server listening on {}", bind_addr);
    get_metrics().await.up.set(1);
    axum::serve(listener, app).await.context("metrics server failed")?;

    Ok(())
}
