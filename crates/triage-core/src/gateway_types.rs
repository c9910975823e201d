use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Remote datastore backends
///
/// Defined in core because configuration selects it and the db crate builds
/// the matching gateway from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayBackend {
    /// Direct Postgres connection to the datastore's database
    Postgres,
    /// PostgREST-style HTTP interface in front of the same tables
    Rest,
}

impl FromStr for GatewayBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(GatewayBackend::Postgres),
            "rest" | "http" => Ok(GatewayBackend::Rest),
            _ => Err(anyhow::anyhow!("Invalid gateway backend: {}", s)),
        }
    }
}

impl Display for GatewayBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            GatewayBackend::Postgres => write!(f, "postgres"),
            GatewayBackend::Rest => write!(f, "rest"),
        }
    }
}
