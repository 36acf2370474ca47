//! Webhook gateway: router wiring and HTTP serving

pub mod state;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::transfer::api::{transfer_failure, transfer_success};
use state::AppState;

/// Health check response data
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub timestamp_ms: u64,
}

fn now_ms() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as u64,
        Err(e) => {
            // Clock is set before the epoch; report 0 rather than failing health
            tracing::warn!("[HEALTH] System clock before UNIX epoch: {}", e);
            0
        }
    }
}

/// Health check endpoint
///
/// - Healthy: 200 OK + {timestamp_ms}
/// - Unhealthy (db unreachable): 503 Service Unavailable
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let now_ms = now_ms();

    match state.db.health_check().await {
        Ok(()) => Ok(Json(HealthResponse { timestamp_ms: now_ms })),
        Err(e) => {
            tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Build the webhook router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/remote/servers/{uuid}/transfer/failure",
            post(transfer_failure),
        )
        .route(
            "/api/remote/servers/{uuid}/transfer/success",
            post(transfer_success),
        )
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind and serve the gateway until shutdown
pub async fn serve(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_past_2020() {
        // 2020-01-01T00:00:00Z in milliseconds
        assert!(now_ms() > 1_577_836_800_000);
    }
}
