//! Row shapes shared by the Postgres and REST backends.
//!
//! Enumerations travel as text and approval as a nullable boolean; conversion into
//! the domain types validates both and clamps scores into 0-100.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use triage_core::models::{
    Consent, Damage, DamageApproval, DamageSeverity, Inspection, InspectionStatus, Photo,
    PolicyStatus, PolicyType,
};
use triage_core::AppError;

fn parse_column<T>(column: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    value
        .parse::<T>()
        .map_err(|e| AppError::Gateway(format!("Unexpected value in column {}: {}", column, e)))
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub(crate) struct InspectionRow {
    pub id: String,
    pub status: String,
    pub policy_type: String,
    pub policy_status: String,
    pub risk_score: i32,
    pub quality_score: i32,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_document: Option<String>,
    pub vehicle_plate: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i32>,
    pub vehicle_color: Option<String>,
    pub vehicle_vin: Option<String>,
    pub tags: Option<Vec<String>>,
    pub client_comments: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InspectionRow> for Inspection {
    type Error = AppError;

    fn try_from(row: InspectionRow) -> Result<Self, Self::Error> {
        Ok(Inspection {
            status: parse_column::<InspectionStatus>("status", &row.status)?,
            policy_type: parse_column::<PolicyType>("policy_type", &row.policy_type)?,
            policy_status: parse_column::<PolicyStatus>("policy_status", &row.policy_status)?,
            id: row.id,
            risk_score: row.risk_score.clamp(0, 100),
            quality_score: row.quality_score.clamp(0, 100),
            sla_deadline: row.sla_deadline,
            client_name: row.client_name,
            client_email: row.client_email,
            client_phone: row.client_phone,
            client_document: row.client_document,
            vehicle_plate: row.vehicle_plate,
            vehicle_make: row.vehicle_make,
            vehicle_model: row.vehicle_model,
            vehicle_year: row.vehicle_year,
            vehicle_color: row.vehicle_color,
            vehicle_vin: row.vehicle_vin,
            tags: row.tags.unwrap_or_default(),
            client_comments: row.client_comments,
            review_notes: row.review_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub(crate) struct DamageRow {
    pub id: String,
    pub inspection_id: String,
    pub part: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "type"))]
    pub damage_type: String,
    pub severity: String,
    pub confidence: i32,
    pub approved: Option<bool>,
}

impl TryFrom<DamageRow> for Damage {
    type Error = AppError;

    fn try_from(row: DamageRow) -> Result<Self, Self::Error> {
        Ok(Damage {
            severity: parse_column::<DamageSeverity>("severity", &row.severity)?,
            id: row.id,
            inspection_id: row.inspection_id,
            part: row.part,
            damage_type: row.damage_type,
            confidence: row.confidence.clamp(0, 100),
            approval: DamageApproval::from_flag(row.approved),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub(crate) struct PhotoRow {
    pub id: String,
    pub inspection_id: String,
    pub url: Option<String>,
    pub category: Option<String>,
    pub angle: Option<String>,
    pub label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub slot: Option<i32>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Photo {
            id: row.id,
            inspection_id: row.inspection_id,
            url: row.url,
            category: row.category,
            angle: row.angle,
            label: row.label,
            latitude: row.latitude,
            longitude: row.longitude,
            captured_at: row.captured_at,
            slot: row.slot,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub(crate) struct ConsentRow {
    pub id: String,
    pub inspection_id: String,
    pub person_type: String,
    pub accepted: Option<bool>,
    pub signature_url: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<ConsentRow> for Consent {
    fn from(row: ConsentRow) -> Self {
        Consent {
            id: row.id,
            inspection_id: row.inspection_id,
            person_type: row.person_type,
            accepted: row.accepted.unwrap_or(false),
            signature_url: row.signature_url,
            accepted_at: row.accepted_at,
        }
    }
}

/// Convert a batch of rows, failing the whole batch on the first bad row.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspection_row_from_rest_json() {
        let row: InspectionRow = serde_json::from_value(serde_json::json!({
            "id": "INS-2025-DEF456",
            "status": "in_review",
            "policy_type": "premium",
            "policy_status": "issued",
            "risk_score": 140,
            "quality_score": 88,
            "sla_deadline": null,
            "client_name": "Maria Souza",
            "client_email": null,
            "client_phone": null,
            "client_document": null,
            "vehicle_plate": "ABC1D23",
            "vehicle_make": "Fiat",
            "vehicle_model": "Argo",
            "vehicle_year": 2022,
            "vehicle_color": null,
            "vehicle_vin": null,
            "tags": null,
            "client_comments": null,
            "review_notes": null,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        let inspection = Inspection::try_from(row).unwrap();
        assert_eq!(inspection.status, InspectionStatus::InReview);
        assert_eq!(inspection.risk_score, 100);
        assert!(inspection.tags.is_empty());
    }

    #[test]
    fn test_unknown_status_is_gateway_error() {
        let row = DamageRow {
            id: "1".to_string(),
            inspection_id: "INS-1".to_string(),
            part: "bumper".to_string(),
            damage_type: "scratch".to_string(),
            severity: "apocalyptic".to_string(),
            confidence: 80,
            approved: None,
        };
        let err = Damage::try_from(row).unwrap_err();
        assert_eq!(err.error_type(), "Gateway");
    }

    #[test]
    fn test_damage_row_uses_type_column() {
        let row: DamageRow = serde_json::from_value(serde_json::json!({
            "id": "3",
            "inspection_id": "INS-1",
            "part": "front door",
            "type": "dent",
            "severity": "moderate",
            "confidence": 91,
            "approved": false
        }))
        .unwrap();
        let damage = Damage::try_from(row).unwrap();
        assert_eq!(damage.damage_type, "dent");
        assert_eq!(damage.approval, DamageApproval::Rejected);
    }
}
