//! SLA clock
//!
//! Remaining or overdue time against an inspection's review deadline. The result
//! depends on "now", so callers evaluate it on every render and never cache it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Label shown for any deadline that has passed.
pub const DEFAULT_OVERDUE_LABEL: &str = "Overdue";

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlaStatus {
    /// No deadline was set for this inspection
    Unavailable,
    /// The deadline is at or before now
    Overdue {
        label: String,
        /// Original deadline as dd/mm/yyyy
        deadline: String,
    },
    Remaining { hours: i64, minutes: i64 },
}

impl SlaStatus {
    pub fn is_overdue(&self) -> bool {
        matches!(self, SlaStatus::Overdue { .. })
    }
}

impl Display for SlaStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SlaStatus::Unavailable => write!(f, "N/A"),
            SlaStatus::Overdue { label, deadline } => write!(f, "{} ({})", label, deadline),
            SlaStatus::Remaining { hours, minutes } => write!(f, "{}h {}m", hours, minutes),
        }
    }
}

/// Evaluate the SLA clock with the default overdue label.
pub fn sla_status(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> SlaStatus {
    sla_status_with_label(deadline, now, DEFAULT_OVERDUE_LABEL)
}

/// Evaluate the SLA clock.
///
/// Hours and minutes are truncated from the millisecond difference, so a deadline
/// 90m59s away reports 1h 30m.
pub fn sla_status_with_label(
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    overdue_label: &str,
) -> SlaStatus {
    let Some(deadline) = deadline else {
        return SlaStatus::Unavailable;
    };

    let diff_ms = (deadline - now).num_milliseconds();
    if diff_ms <= 0 {
        return SlaStatus::Overdue {
            label: overdue_label.to_string(),
            deadline: deadline.format("%d/%m/%Y").to_string(),
        };
    }

    SlaStatus::Remaining {
        hours: diff_ms / MS_PER_HOUR,
        minutes: (diff_ms % MS_PER_HOUR) / MS_PER_MINUTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_deadline_is_unavailable() {
        assert_eq!(sla_status(None, now()), SlaStatus::Unavailable);
        assert_eq!(SlaStatus::Unavailable.to_string(), "N/A");
    }

    #[test]
    fn test_ninety_minutes_ahead() {
        let status = sla_status(Some(now() + Duration::minutes(90)), now());
        assert_eq!(status, SlaStatus::Remaining { hours: 1, minutes: 30 });
        assert_eq!(status.to_string(), "1h 30m");
    }

    #[test]
    fn test_truncates_partial_minutes() {
        let deadline = now() + Duration::minutes(90) + Duration::seconds(59);
        assert_eq!(
            sla_status(Some(deadline), now()),
            SlaStatus::Remaining { hours: 1, minutes: 30 }
        );
    }

    #[test]
    fn test_five_minutes_past_is_overdue() {
        let deadline = now() - Duration::minutes(5);
        let status = sla_status(Some(deadline), now());
        assert_eq!(
            status,
            SlaStatus::Overdue {
                label: "Overdue".to_string(),
                deadline: "14/03/2025".to_string(),
            }
        );
        assert!(status.is_overdue());
    }

    #[test]
    fn test_deadline_equal_to_now_is_overdue() {
        assert!(sla_status(Some(now()), now()).is_overdue());
    }

    #[test]
    fn test_remaining_decreases_until_overdue_then_stays_overdue() {
        let deadline = now() + Duration::hours(3);
        let mut previous_total: Option<i64> = None;
        for step in 0..180 {
            let at = now() + Duration::minutes(step);
            match sla_status(Some(deadline), at) {
                SlaStatus::Remaining { hours, minutes } => {
                    let total = hours * 60 + minutes;
                    if let Some(prev) = previous_total {
                        assert!(total < prev, "remaining must shrink as now advances");
                    }
                    previous_total = Some(total);
                }
                other => panic!("expected remaining at step {}, got {:?}", step, other),
            }
        }
        for step in 180..240 {
            let at = now() + Duration::minutes(step);
            assert!(sla_status(Some(deadline), at).is_overdue());
        }
    }

    #[test]
    fn test_custom_label() {
        let status = sla_status_with_label(Some(now() - Duration::hours(1)), now(), "Vencido");
        assert_eq!(status.to_string(), "Vencido (14/03/2025)");
    }
}
