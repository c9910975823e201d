use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Consent given by a person attached to an inspection. Read-only in the review workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Consent {
    pub id: String,
    pub inspection_id: String,
    /// Who consented, e.g. "insured" or "driver"
    pub person_type: String,
    pub accepted: bool,
    pub signature_url: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
}
