use anyhow::{anyhow, Result};
use axum::routing::get;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::settings::{MetricsConfig, SettingsConfig};
use crate::issuer::TokenDispatcher;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::headers::no_cache;
use crate::server::routes::{get_both_tokens, get_rtc_token, get_rtm_token, ping};

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub dispatcher: TokenDispatcher,
}

impl AppState {
    pub fn new(metrics: &Metrics, dispatcher: TokenDispatcher) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            dispatcher,
        }
    }
}

/// Token routes are reachable with and without the trailing slash.
fn token_router() -> Router<AppState> {
    Router::new()
        .route("/rtc/{channelName}/{role}/{tokentype}/{uid}", get(get_rtc_token))
        .route("/rtc/{channelName}/{role}/{tokentype}/{uid}/", get(get_rtc_token))
        .route("/rtm/{uid}", get(get_rtm_token))
        .route("/rtm/{uid}/", get(get_rtm_token))
        .route("/rte/{channelName}/{role}/{tokentype}/{uid}", get(get_both_tokens))
        .route("/rte/{channelName}/{role}/{tokentype}/{uid}/", get(get_both_tokens))
        .layer(middleware::from_fn(no_cache))
}

pub fn router(state: AppState, metrics_config: &MetricsConfig) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .merge(token_router())
        .merge(state.metrics_state.router(metrics_config))
        .with_state(state)
}

/// Serve until ctrl-c. Credentials must already be loaded.
pub async fn start(settings_config: &SettingsConfig, dispatcher: TokenDispatcher) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, dispatcher);
    let app = router(state, &settings_config.metrics);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("unable to bind {}: {}", bind_addr, e))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
