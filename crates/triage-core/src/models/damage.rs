use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DamageSeverity {
    Minor,
    Moderate,
    Severe,
    TotalLoss,
}

impl DamageSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            DamageSeverity::Minor => "Minor",
            DamageSeverity::Moderate => "Moderate",
            DamageSeverity::Severe => "Severe",
            DamageSeverity::TotalLoss => "Total loss",
        }
    }
}

impl Display for DamageSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DamageSeverity::Minor => write!(f, "minor"),
            DamageSeverity::Moderate => write!(f, "moderate"),
            DamageSeverity::Severe => write!(f, "severe"),
            DamageSeverity::TotalLoss => write!(f, "total_loss"),
        }
    }
}

impl FromStr for DamageSeverity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minor" => Ok(DamageSeverity::Minor),
            "moderate" => Ok(DamageSeverity::Moderate),
            "severe" => Ok(DamageSeverity::Severe),
            "total_loss" => Ok(DamageSeverity::TotalLoss),
            _ => Err(anyhow::anyhow!("Invalid damage severity: {}", s)),
        }
    }
}

/// Reviewer judgment on a single detected damage.
///
/// Stored as a nullable boolean in the datastore; `Unjudged` is the null.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DamageApproval {
    #[default]
    Unjudged,
    Approved,
    Rejected,
}

impl DamageApproval {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => DamageApproval::Unjudged,
            Some(true) => DamageApproval::Approved,
            Some(false) => DamageApproval::Rejected,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            DamageApproval::Unjudged => None,
            DamageApproval::Approved => Some(true),
            DamageApproval::Rejected => Some(false),
        }
    }
}

impl Display for DamageApproval {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DamageApproval::Unjudged => write!(f, "unjudged"),
            DamageApproval::Approved => write!(f, "approved"),
            DamageApproval::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<bool> for DamageApproval {
    fn from(approved: bool) -> Self {
        DamageApproval::from_flag(Some(approved))
    }
}

/// AI-detected damage on an inspected vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Damage {
    pub id: String,
    pub inspection_id: String,
    pub part: String,
    pub damage_type: String,
    pub severity: DamageSeverity,
    /// Detector confidence, 0-100
    pub confidence: i32,
    #[serde(default)]
    pub approval: DamageApproval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_flag_mapping() {
        assert_eq!(DamageApproval::from_flag(None), DamageApproval::Unjudged);
        assert_eq!(DamageApproval::from(true), DamageApproval::Approved);
        assert_eq!(DamageApproval::from(false), DamageApproval::Rejected);
        assert_eq!(DamageApproval::Unjudged.as_flag(), None);
        assert_eq!(DamageApproval::Rejected.as_flag(), Some(false));
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(
            "total_loss".parse::<DamageSeverity>().unwrap(),
            DamageSeverity::TotalLoss
        );
        assert!("catastrophic".parse::<DamageSeverity>().is_err());
    }
}
