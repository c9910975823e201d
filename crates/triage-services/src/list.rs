//! List/filter engine
//!
//! Holds the full inspection set and derives filtered views and status counters
//! from it. Everything here except [`ListViewState::load`] is pure and synchronous.

use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use triage_core::models::{Inspection, InspectionStatus, PolicyStatus, PolicyType};
use triage_core::ErrorMetadata;
use triage_db::InspectionRepository;
use utoipa::ToSchema;

const ALL_SENTINEL: &str = "all";

/// Categorical filter with an "all" sentinel that matches every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Filter::Only(_))
    }
}

impl<T> FromStr for Filter<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Ok(Filter::All);
        }
        s.parse::<T>().map(Filter::Only)
    }
}

impl<T: Display> Display for Filter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Filter::All => write!(f, "{}", ALL_SENTINEL),
            Filter::Only(value) => write!(f, "{}", value),
        }
    }
}

impl<T: Serialize> Serialize for Filter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Filter::All => serializer.serialize_str(ALL_SENTINEL),
            Filter::Only(value) => value.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectionFilters {
    pub status: Filter<InspectionStatus>,
    pub policy_type: Filter<PolicyType>,
    pub policy_status: Filter<PolicyStatus>,
}

impl InspectionFilters {
    pub fn matches(&self, inspection: &Inspection) -> bool {
        self.status.matches(&inspection.status)
            && self.policy_type.matches(&inspection.policy_type)
            && self.policy_status.matches(&inspection.policy_status)
    }
}

/// Case-insensitive substring match against id, client name and plate.
/// An empty term matches everything. Whitespace is part of the term.
pub fn matches_search(inspection: &Inspection, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    [
        Some(inspection.id.as_str()),
        inspection.client_name.as_deref(),
        inspection.vehicle_plate.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// The subsequence of `records`, in original order, passing the search and every filter.
pub fn filter_inspections<'a>(
    records: &'a [Inspection],
    search_term: &str,
    filters: &InspectionFilters,
) -> Vec<&'a Inspection> {
    records
        .iter()
        .filter(|inspection| matches_search(inspection, search_term) && filters.matches(inspection))
        .collect()
}

/// Summary counters. Rejected inspections are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_review: usize,
    pub approved: usize,
    pub needs_reinspection: usize,
}

pub fn aggregate_counts(records: &[Inspection]) -> StatusCounts {
    records
        .iter()
        .fold(StatusCounts::default(), |mut counts, inspection| {
            match inspection.status {
                InspectionStatus::Pending => counts.pending += 1,
                InspectionStatus::InReview => counts.in_review += 1,
                InspectionStatus::Approved => counts.approved += 1,
                InspectionStatus::NeedsReinspection => counts.needs_reinspection += 1,
                InspectionStatus::Rejected => {}
            }
            counts
        })
}

/// State of the inspection list screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListViewState {
    pub records: Vec<Inspection>,
    pub search_term: String,
    pub filters: InspectionFilters,
    /// Set when the last load failed; `records` is then empty
    pub load_error: Option<String>,
}

impl ListViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a fresh copy of every inspection, keeping search and filters.
    ///
    /// A failed load leaves the list empty with a message. Nothing is retried.
    pub async fn load(&mut self, repository: &InspectionRepository) {
        match repository.list_inspections().await {
            Ok(records) => {
                self.records = records;
                self.load_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load inspection list");
                self.records.clear();
                self.load_error = Some(e.client_message());
            }
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_filters(&mut self, filters: InspectionFilters) {
        self.filters = filters;
    }

    pub fn visible(&self) -> Vec<&Inspection> {
        filter_inspections(&self.records, &self.search_term, &self.filters)
    }

    /// Counts over every loaded record, ignoring search and filters.
    pub fn counts(&self) -> StatusCounts {
        aggregate_counts(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use triage_db::test_helpers::{sample_inspection, GatewayOperation, InMemoryGateway};

    fn inspection(id: &str, status: InspectionStatus) -> Inspection {
        Inspection {
            status,
            ..sample_inspection(id)
        }
    }

    fn scenario_set() -> Vec<Inspection> {
        vec![
            inspection("INS-1", InspectionStatus::Pending),
            inspection("INS-2", InspectionStatus::InReview),
            inspection("INS-3", InspectionStatus::Approved),
            inspection("INS-4", InspectionStatus::Pending),
            inspection("INS-5", InspectionStatus::NeedsReinspection),
        ]
    }

    #[test]
    fn test_aggregate_counts() {
        assert_eq!(
            aggregate_counts(&scenario_set()),
            StatusCounts {
                pending: 2,
                in_review: 1,
                approved: 1,
                needs_reinspection: 1,
            }
        );
    }

    #[test]
    fn test_search_matches_id_substring_case_insensitively() {
        let records = vec![sample_inspection("INS-2025-DEF456")];
        let filters = InspectionFilters::default();

        assert_eq!(filter_inspections(&records, "DEF", &filters).len(), 1);
        assert_eq!(filter_inspections(&records, "def", &filters).len(), 1);
        assert!(filter_inspections(&records, "xyz", &filters).is_empty());
    }

    #[test]
    fn test_search_covers_client_name_and_plate() {
        let mut record = sample_inspection("INS-1");
        record.client_name = Some("João Pereira".to_string());
        record.vehicle_plate = Some("XYZ9K88".to_string());

        assert!(matches_search(&record, "pereira"));
        assert!(matches_search(&record, "9k8"));
        assert!(matches_search(&record, ""));
        assert!(!matches_search(&record, "souza"));
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let mut record = sample_inspection("INS-1");
        assert!(!matches_search(&record, "INS "));
        assert!(!matches_search(&record, " ins"));
        // "Maria Souza" contains a space.
        assert!(matches_search(&record, "a s"));
        assert!(matches_search(&record, " "));

        record.client_name = None;
        assert!(!matches_search(&record, " "));
    }

    #[test]
    fn test_search_skips_missing_fields() {
        let mut record = sample_inspection("INS-1");
        record.client_name = None;
        record.vehicle_plate = None;
        assert!(matches_search(&record, "ins"));
        assert!(!matches_search(&record, "maria"));
    }

    #[test]
    fn test_filtering_is_an_ordered_subsequence() {
        let records = scenario_set();
        let filters = InspectionFilters {
            status: Filter::Only(InspectionStatus::Pending),
            ..Default::default()
        };

        let ids: Vec<_> = filter_inspections(&records, "", &filters)
            .into_iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["INS-1", "INS-4"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let mut premium = inspection("INS-10", InspectionStatus::Pending);
        premium.policy_type = PolicyType::Premium;
        let mut records = scenario_set();
        records.push(premium);

        let filters = InspectionFilters {
            status: Filter::Only(InspectionStatus::Pending),
            policy_type: Filter::Only(PolicyType::Premium),
            policy_status: Filter::All,
        };
        let visible = filter_inspections(&records, "ins-1", &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "INS-10");
    }

    #[test]
    fn test_counts_ignore_search_and_filters() {
        let mut state = ListViewState {
            records: scenario_set(),
            ..Default::default()
        };
        let before = state.counts();

        state.set_search_term("INS-3");
        state.set_filters(InspectionFilters {
            status: Filter::Only(InspectionStatus::Approved),
            ..Default::default()
        });

        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.counts(), before);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<Filter<InspectionStatus>>().unwrap(), Filter::All);
        assert_eq!("".parse::<Filter<PolicyType>>().unwrap(), Filter::All);
        assert_eq!(
            "in_review".parse::<Filter<InspectionStatus>>().unwrap(),
            Filter::Only(InspectionStatus::InReview)
        );
        assert!("done".parse::<Filter<InspectionStatus>>().is_err());
    }

    #[test]
    fn test_filter_serializes_sentinel() {
        let filters = InspectionFilters {
            status: Filter::Only(InspectionStatus::NeedsReinspection),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["status"], "needs_reinspection");
        assert_eq!(json["policy_type"], "all");
    }

    #[tokio::test]
    async fn test_load_failure_leaves_empty_list_with_message() {
        let gateway = InMemoryGateway::new().with_inspection(sample_inspection("INS-1"));
        let repository = InspectionRepository::new(Arc::new(gateway.clone()));

        let mut state = ListViewState::new();
        state.set_search_term("INS");
        state.load(&repository).await;
        assert_eq!(state.records.len(), 1);
        assert!(state.load_error.is_none());

        gateway.fail_on(GatewayOperation::SelectInspections);
        state.load(&repository).await;
        assert!(state.records.is_empty());
        assert!(state.load_error.is_some());
        assert_eq!(state.search_term, "INS");
        assert_eq!(gateway.call_count(GatewayOperation::SelectInspections), 2);
    }
}
