//! Configuration module
//!
//! Environment-driven settings for the API server and the CLI: which datastore
//! gateway to use, its connection details, and the HTTP server basics.

use std::env;

use crate::gateway_types::GatewayBackend;
use crate::sla::DEFAULT_OVERDUE_LABEL;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Base configuration shared by the server and the CLI
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Triage console configuration
#[derive(Clone, Debug)]
pub struct TriageConfig {
    pub base: BaseConfig,
    pub gateway_backend: GatewayBackend,
    // Postgres gateway
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // REST gateway
    pub datastore_url: Option<String>,
    pub datastore_api_key: Option<String>,
    // Presentation
    pub sla_overdue_label: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<TriageConfig>);

impl Config {
    fn as_triage(&self) -> &TriageConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_triage().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = TriageConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_triage().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_triage().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_triage().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_triage().base.environment
    }

    pub fn gateway_backend(&self) -> GatewayBackend {
        self.as_triage().gateway_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_triage().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_triage().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_triage().db_timeout_seconds
    }

    pub fn datastore_url(&self) -> Option<&str> {
        self.as_triage().datastore_url.as_deref()
    }

    pub fn datastore_api_key(&self) -> Option<&str> {
        self.as_triage().datastore_api_key.as_deref()
    }

    pub fn sla_overdue_label(&self) -> &str {
        &self.as_triage().sla_overdue_label
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TriageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("SERVER_PORT must be a valid port number: {}", e))?;

        let gateway_backend = match non_empty_var("GATEWAY_BACKEND") {
            Some(value) => value.parse::<GatewayBackend>()?,
            None => GatewayBackend::Rest,
        };

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .unwrap_or(MAX_CONNECTIONS);

        let db_timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(CONNECTION_TIMEOUT_SECS);

        let config = TriageConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
            },
            gateway_backend,
            database_url: non_empty_var("DATABASE_URL"),
            db_max_connections,
            db_timeout_seconds,
            datastore_url: non_empty_var("DATASTORE_URL"),
            datastore_api_key: non_empty_var("DATASTORE_API_KEY"),
            sla_overdue_label: non_empty_var("SLA_OVERDUE_LABEL")
                .unwrap_or_else(|| DEFAULT_OVERDUE_LABEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.gateway_backend {
            GatewayBackend::Postgres => {
                let url = self.database_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("GATEWAY_BACKEND=postgres requires DATABASE_URL to be set")
                })?;
                if !(url.starts_with("postgresql://") || url.starts_with("postgres://")) {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ));
                }
                if self.db_max_connections == 0 {
                    return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
                }
            }
            GatewayBackend::Rest => {
                let url = self.datastore_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("GATEWAY_BACKEND=rest requires DATASTORE_URL to be set")
                })?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(anyhow::anyhow!("DATASTORE_URL must be an http(s) URL"));
                }
                if self.datastore_api_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "GATEWAY_BACKEND=rest requires DATASTORE_API_KEY to be set"
                    ));
                }
            }
        }

        if is_production_name(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}
