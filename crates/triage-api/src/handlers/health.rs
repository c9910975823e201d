//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub datastore: String,
    pub backend: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Datastore reachable", body = HealthResponse),
        (status = 503, description = "Datastore unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let datastore =
        match tokio::time::timeout(CHECK_TIMEOUT, state.repository.health_check()).await {
            Ok(Ok(())) => "healthy".to_string(),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Datastore health check failed");
                format!("unhealthy: {}", e)
            }
            Err(_) => {
                tracing::error!("Datastore health check timed out");
                "timeout".to_string()
            }
        };

    let healthy = datastore == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            datastore,
            backend: state.repository.backend_name().to_string(),
        }),
    )
}
