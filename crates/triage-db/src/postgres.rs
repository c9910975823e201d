//! Postgres gateway
//!
//! Talks directly to the database behind the managed datastore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use triage_core::models::{Consent, Damage, Inspection, InspectionStatus, Photo};
use triage_core::AppError;

use crate::models::{convert_all, ConsentRow, DamageRow, InspectionRow, PhotoRow};
use crate::traits::InspectionGateway;

const INSPECTION_COLUMNS: &str = "id, status, policy_type, policy_status, risk_score, quality_score, \
     sla_deadline, client_name, client_email, client_phone, client_document, vehicle_plate, \
     vehicle_make, vehicle_model, vehicle_year, vehicle_color, vehicle_vin, tags, \
     client_comments, review_notes, created_at, updated_at";

#[derive(Clone)]
pub struct PgInspectionGateway {
    pool: PgPool,
}

impl PgInspectionGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout_seconds: u64,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to inspection database");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InspectionGateway for PgInspectionGateway {
    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select"))]
    async fn select_inspections(&self) -> Result<Vec<Inspection>, AppError> {
        let rows = sqlx::query_as::<Postgres, InspectionRow>(&format!(
            "SELECT {} FROM inspections ORDER BY created_at DESC",
            INSPECTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select", db.record_id = %id))]
    async fn select_inspection(&self, id: &str) -> Result<Option<Inspection>, AppError> {
        let row = sqlx::query_as::<Postgres, InspectionRow>(&format!(
            "SELECT {} FROM inspections WHERE id = $1",
            INSPECTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Inspection::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "select"))]
    async fn select_damages(&self, inspection_id: &str) -> Result<Vec<Damage>, AppError> {
        let rows = sqlx::query_as::<Postgres, DamageRow>(
            r#"
            SELECT id, inspection_id, part, "type", severity, confidence, approved
            FROM damages
            WHERE inspection_id = $1
            "#,
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select"))]
    async fn select_photos(&self, inspection_id: &str) -> Result<Vec<Photo>, AppError> {
        let rows = sqlx::query_as::<Postgres, PhotoRow>(
            r#"
            SELECT id, inspection_id, url, category, angle, label, latitude, longitude,
                   captured_at, slot
            FROM photos
            WHERE inspection_id = $1
            "#,
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "consents", db.operation = "select"))]
    async fn select_consent(&self, inspection_id: &str) -> Result<Option<Consent>, AppError> {
        let row = sqlx::query_as::<Postgres, ConsentRow>(
            r#"
            SELECT id, inspection_id, person_type, accepted, signature_url, accepted_at
            FROM consents
            WHERE inspection_id = $1
            ORDER BY accepted_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(inspection_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Consent::from))
    }

    #[tracing::instrument(skip(self, review_notes), fields(db.table = "inspections", db.operation = "update", db.record_id = %id))]
    async fn update_inspection_status(
        &self,
        id: &str,
        status: InspectionStatus,
        review_notes: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE inspections SET status = $1, review_notes = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(status.to_string())
        .bind(review_notes)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "update", db.record_id = %damage_id))]
    async fn update_damage_approval(
        &self,
        damage_id: &str,
        approved: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE damages SET approved = $1 WHERE id = $2")
            .bind(approved)
            .bind(damage_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
