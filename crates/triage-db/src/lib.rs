//! Triage data access
//!
//! This crate talks to the remote inspection datastore. It contains:
//!
//! - the [`InspectionGateway`] trait, the contract every datastore backend satisfies
//!   (equality-filtered queries, point lookups that tell "zero rows" from "error",
//!   partial-field updates by primary key);
//! - a Postgres backend (sqlx) and a PostgREST-style HTTP backend (reqwest);
//! - [`InspectionRepository`], the typed facade the rest of the workspace uses.
//!
//! Every operation is a single attempt. Nothing in this crate retries.

pub mod factory;
pub(crate) mod models;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
#[cfg(feature = "rest")]
pub mod rest;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_gateway;
#[cfg(feature = "postgres")]
pub use postgres::PgInspectionGateway;
pub use repository::InspectionRepository;
#[cfg(feature = "rest")]
pub use rest::RestInspectionGateway;
pub use traits::InspectionGateway;
pub use triage_core::GatewayBackend;
