//! Datastore gateway abstraction
//!
//! This module defines the trait every remote datastore backend implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use triage_core::models::{Consent, Damage, Inspection, InspectionStatus, Photo};
use triage_core::AppError;

/// Record-oriented access to the four inspection collections.
///
/// Backends return records as stored; ordering guarantees beyond "newest first"
/// for inspections and the mapping of missing rows to domain errors are the
/// repository's job.
#[async_trait]
pub trait InspectionGateway: Send + Sync {
    /// All inspections, sorted by `created_at` descending.
    async fn select_inspections(&self) -> Result<Vec<Inspection>, AppError>;

    /// Point lookup by primary key. `Ok(None)` means zero rows, not an error.
    async fn select_inspection(&self, id: &str) -> Result<Option<Inspection>, AppError>;

    async fn select_damages(&self, inspection_id: &str) -> Result<Vec<Damage>, AppError>;

    async fn select_photos(&self, inspection_id: &str) -> Result<Vec<Photo>, AppError>;

    /// Most recent consent for the inspection, if any.
    async fn select_consent(&self, inspection_id: &str) -> Result<Option<Consent>, AppError>;

    /// Partial update of status, review notes and update timestamp.
    /// Returns the number of rows touched.
    async fn update_inspection_status(
        &self,
        id: &str,
        status: InspectionStatus,
        review_notes: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Partial update of a damage's approval flag. Returns the number of rows touched.
    async fn update_damage_approval(&self, damage_id: &str, approved: bool)
        -> Result<u64, AppError>;

    /// Cheap connectivity probe used by health checks.
    async fn ping(&self) -> Result<(), AppError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
