//! Triage Core Library
//!
//! This crate provides the domain models, error types, configuration, and the pure
//! time/score helpers shared by every triage component.

pub mod config;
pub mod error;
pub mod gateway_types;
pub mod models;
pub mod sla;

// Re-export commonly used types
pub use config::{BaseConfig, Config, TriageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use gateway_types::GatewayBackend;
pub use sla::{sla_status, sla_status_with_label, SlaStatus, DEFAULT_OVERDUE_LABEL};
