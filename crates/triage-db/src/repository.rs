use chrono::{DateTime, Utc};
use std::sync::Arc;
use triage_core::models::{Consent, Damage, Inspection, InspectionStatus, Photo};
use triage_core::AppError;

use crate::traits::InspectionGateway;

/// Typed access to inspections and the records they own.
///
/// Wraps a gateway and turns "zero rows" into `NotFound` for point lookups and
/// unmatched updates into gateway errors. Single attempt per call, no retries.
#[derive(Clone)]
pub struct InspectionRepository {
    gateway: Arc<dyn InspectionGateway>,
}

impl InspectionRepository {
    pub fn new(gateway: Arc<dyn InspectionGateway>) -> Self {
        Self { gateway }
    }

    pub fn backend_name(&self) -> &'static str {
        self.gateway.backend_name()
    }

    /// All inspections, newest `created_at` first. All-or-nothing.
    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select"))]
    pub async fn list_inspections(&self) -> Result<Vec<Inspection>, AppError> {
        let mut inspections = self.gateway.select_inspections().await?;
        // Stable, so equal timestamps keep the gateway's order.
        inspections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tracing::debug!(count = inspections.len(), "Loaded inspections");
        Ok(inspections)
    }

    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select", db.record_id = %id))]
    pub async fn get_inspection(&self, id: &str) -> Result<Inspection, AppError> {
        self.gateway
            .select_inspection(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "select"))]
    pub async fn list_damages(&self, inspection_id: &str) -> Result<Vec<Damage>, AppError> {
        self.gateway.select_damages(inspection_id).await
    }

    /// Photos in gateway order; display order is applied by the detail view.
    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select"))]
    pub async fn list_photos(&self, inspection_id: &str) -> Result<Vec<Photo>, AppError> {
        self.gateway.select_photos(inspection_id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "consents", db.operation = "select"))]
    pub async fn get_consent(&self, inspection_id: &str) -> Result<Option<Consent>, AppError> {
        self.gateway.select_consent(inspection_id).await
    }

    /// Persist a reviewer decision. Stamps `updated_at` with the current time and
    /// returns it as the acknowledgment.
    #[tracing::instrument(skip(self, review_notes), fields(db.table = "inspections", db.operation = "update", db.record_id = %id))]
    pub async fn set_inspection_status(
        &self,
        id: &str,
        status: InspectionStatus,
        review_notes: &str,
    ) -> Result<DateTime<Utc>, AppError> {
        let updated_at = Utc::now();
        let touched = self
            .gateway
            .update_inspection_status(id, status, review_notes, updated_at)
            .await?;

        if touched == 0 {
            return Err(AppError::Gateway(format!(
                "Status update matched no inspection with id {}",
                id
            )));
        }

        tracing::info!(inspection_id = %id, status = %status, "Inspection status updated");
        Ok(updated_at)
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "update", db.record_id = %damage_id))]
    pub async fn set_damage_approval(&self, damage_id: &str, approved: bool) -> Result<(), AppError> {
        let touched = self
            .gateway
            .update_damage_approval(damage_id, approved)
            .await?;

        if touched == 0 {
            return Err(AppError::Gateway(format!(
                "Approval update matched no damage with id {}",
                damage_id
            )));
        }

        tracing::info!(damage_id = %damage_id, approved, "Damage approval updated");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.gateway.ping().await
    }
}
