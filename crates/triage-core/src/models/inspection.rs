use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Review status of an inspection.
///
/// Starts at `Pending` and only moves through an explicit reviewer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Pending,
    InReview,
    Approved,
    Rejected,
    NeedsReinspection,
}

impl InspectionStatus {
    pub const ALL: [InspectionStatus; 5] = [
        InspectionStatus::Pending,
        InspectionStatus::InReview,
        InspectionStatus::Approved,
        InspectionStatus::Rejected,
        InspectionStatus::NeedsReinspection,
    ];

    /// Human-readable label used by the report and the CLI table.
    pub fn label(&self) -> &'static str {
        match self {
            InspectionStatus::Pending => "Pending",
            InspectionStatus::InReview => "In review",
            InspectionStatus::Approved => "Approved",
            InspectionStatus::Rejected => "Rejected",
            InspectionStatus::NeedsReinspection => "Needs re-inspection",
        }
    }
}

impl Display for InspectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InspectionStatus::Pending => write!(f, "pending"),
            InspectionStatus::InReview => write!(f, "in_review"),
            InspectionStatus::Approved => write!(f, "approved"),
            InspectionStatus::Rejected => write!(f, "rejected"),
            InspectionStatus::NeedsReinspection => write!(f, "needs_reinspection"),
        }
    }
}

impl FromStr for InspectionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InspectionStatus::Pending),
            "in_review" => Ok(InspectionStatus::InReview),
            "approved" => Ok(InspectionStatus::Approved),
            "rejected" => Ok(InspectionStatus::Rejected),
            "needs_reinspection" => Ok(InspectionStatus::NeedsReinspection),
            _ => Err(anyhow::anyhow!("Invalid inspection status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    Premium,
    Standard,
    Comprehensive,
}

impl Display for PolicyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PolicyType::Premium => write!(f, "premium"),
            PolicyType::Standard => write!(f, "standard"),
            PolicyType::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

impl FromStr for PolicyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "premium" => Ok(PolicyType::Premium),
            "standard" => Ok(PolicyType::Standard),
            "comprehensive" => Ok(PolicyType::Comprehensive),
            _ => Err(anyhow::anyhow!("Invalid policy type: {}", s)),
        }
    }
}

/// Policy lifecycle as set by the upstream underwriting process. Read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    InProcess,
    Issued,
    Rejected,
    Cancelled,
}

impl Display for PolicyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PolicyStatus::InProcess => write!(f, "in_process"),
            PolicyStatus::Issued => write!(f, "issued"),
            PolicyStatus::Rejected => write!(f, "rejected"),
            PolicyStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for PolicyStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_process" => Ok(PolicyStatus::InProcess),
            "issued" => Ok(PolicyStatus::Issued),
            "rejected" => Ok(PolicyStatus::Rejected),
            "cancelled" => Ok(PolicyStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid policy status: {}", s)),
        }
    }
}

/// Severity tier derived from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// ≥70 is high, ≥50 is medium, anything below is low.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 70 => RiskTier::High,
            s if s >= 50 => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }
}

impl Display for RiskTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

/// The reviewable unit: one vehicle damage assessment tied to a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Inspection {
    pub id: String,
    pub status: InspectionStatus,
    pub policy_type: PolicyType,
    pub policy_status: PolicyStatus,
    /// 0-100, computed upstream
    pub risk_score: i32,
    /// 0-100, computed upstream
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
    #[serde(default)]
    pub tags: Vec<String>,
    pub client_comments: Option<String>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inspection {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.risk_score)
    }

    /// "Make Model (Year)" with whichever parts are present.
    pub fn vehicle_description(&self) -> Option<String> {
        let name = [self.vehicle_make.as_deref(), self.vehicle_model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        match (name.is_empty(), self.vehicle_year) {
            (true, None) => None,
            (true, Some(year)) => Some(year.to_string()),
            (false, None) => Some(name),
            (false, Some(year)) => Some(format!("{} ({})", name, year)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspection_status_display_round_trips() {
        for status in InspectionStatus::ALL {
            assert_eq!(status.to_string().parse::<InspectionStatus>().unwrap(), status);
        }
        assert!("in-review".parse::<InspectionStatus>().is_err());
    }

    #[test]
    fn test_inspection_status_serde_matches_display() {
        let json = serde_json::to_string(&InspectionStatus::NeedsReinspection).unwrap();
        assert_eq!(json, "\"needs_reinspection\"");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("premium".parse::<PolicyType>().unwrap(), PolicyType::Premium);
        assert_eq!(
            "in_process".parse::<PolicyStatus>().unwrap(),
            PolicyStatus::InProcess
        );
        assert!("gold".parse::<PolicyType>().is_err());
    }

    #[test]
    fn test_risk_tier_boundaries() {
        assert_eq!(RiskTier::from_score(100), RiskTier::High);
        assert_eq!(RiskTier::from_score(70), RiskTier::High);
        assert_eq!(RiskTier::from_score(69), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(50), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(49), RiskTier::Low);
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
    }
}
