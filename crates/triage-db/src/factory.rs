#[cfg(feature = "postgres")]
use crate::PgInspectionGateway;
#[cfg(feature = "rest")]
use crate::RestInspectionGateway;
use crate::{GatewayBackend, InspectionGateway};
use std::sync::Arc;
use triage_core::{AppError, Config};

/// Create the datastore gateway selected by configuration
pub async fn create_gateway(config: &Config) -> Result<Arc<dyn InspectionGateway>, AppError> {
    match config.gateway_backend() {
        #[cfg(feature = "postgres")]
        GatewayBackend::Postgres => {
            let database_url = config.database_url().ok_or_else(|| {
                AppError::InvalidInput("DATABASE_URL not configured".to_string())
            })?;

            let gateway = PgInspectionGateway::connect(
                database_url,
                config.db_max_connections(),
                config.db_timeout_seconds(),
            )
            .await?;
            Ok(Arc::new(gateway))
        }

        #[cfg(not(feature = "postgres"))]
        GatewayBackend::Postgres => Err(AppError::InvalidInput(
            "Postgres gateway not available (postgres feature not enabled)".to_string(),
        )),

        #[cfg(feature = "rest")]
        GatewayBackend::Rest => {
            let base_url = config.datastore_url().ok_or_else(|| {
                AppError::InvalidInput("DATASTORE_URL not configured".to_string())
            })?;
            let api_key = config.datastore_api_key().ok_or_else(|| {
                AppError::InvalidInput("DATASTORE_API_KEY not configured".to_string())
            })?;

            let gateway = RestInspectionGateway::new(base_url, api_key.to_string())?;
            tracing::info!(base_url = %gateway.base_url(), "Using REST inspection gateway");
            Ok(Arc::new(gateway))
        }

        #[cfg(not(feature = "rest"))]
        GatewayBackend::Rest => Err(AppError::InvalidInput(
            "REST gateway not available (rest feature not enabled)".to_string(),
        )),
    }
}
