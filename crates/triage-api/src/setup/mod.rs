//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use triage_core::Config;
use triage_db::{create_gateway, InspectionRepository};
use triage_infra::{init_telemetry, LogFormat};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    init_telemetry(
        "triage-api",
        config.environment(),
        LogFormat::for_environment(config.environment()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        backend = %config.gateway_backend(),
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let gateway = create_gateway(&config)
        .await
        .context("Failed to create inspection gateway")?;
    let repository = InspectionRepository::new(gateway);

    let state = Arc::new(AppState::new(repository, config.clone()));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
