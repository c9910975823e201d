use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::load_detail;
use crate::state::AppState;
use axum::{
    extract::rejection::QueryRejection,
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use triage_core::models::{Inspection, RiskTier};
use triage_core::{sla_status_with_label, AppError, SlaStatus};
use triage_services::{
    DetailViewState, Filter, GallerySlot, InspectionFilters, ListViewState, StatusCounts,
};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListInspectionsQuery {
    /// Substring of id, client name or plate
    pub search: Option<String>,
    /// Inspection status or "all"
    pub status: Option<String>,
    /// Policy type or "all"
    pub policy_type: Option<String>,
    /// Policy status or "all"
    pub policy_status: Option<String>,
}

fn parse_filter<T>(name: &str, value: Option<&str>) -> Result<Filter<T>, AppError>
where
    T: FromStr<Err = anyhow::Error>,
{
    value
        .unwrap_or_default()
        .parse::<Filter<T>>()
        .map_err(|e| AppError::InvalidInput(format!("Invalid {} filter: {}", name, e)))
}

impl ListInspectionsQuery {
    fn filters(&self) -> Result<InspectionFilters, AppError> {
        Ok(InspectionFilters {
            status: parse_filter("status", self.status.as_deref())?,
            policy_type: parse_filter("policy_type", self.policy_type.as_deref())?,
            policy_status: parse_filter("policy_status", self.policy_status.as_deref())?,
        })
    }
}

/// List row: the inspection plus values derived at request time.
#[derive(Debug, Serialize, ToSchema)]
pub struct InspectionSummary {
    #[serde(flatten)]
    pub inspection: Inspection,
    pub risk_tier: RiskTier,
    pub sla: SlaStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InspectionListResponse {
    pub inspections: Vec<InspectionSummary>,
    /// Over every inspection, regardless of search and filters
    pub counts: StatusCounts,
    pub total: usize,
    /// Present when the datastore could not be read; the list is then empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/inspections",
    tag = "inspections",
    params(ListInspectionsQuery),
    responses(
        (status = 200, description = "Filtered inspections, newest first", body = InspectionListResponse),
        (status = 400, description = "Unknown filter value", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_inspections"))]
pub async fn list_inspections(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListInspectionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let filters = query.filters()?;

    let mut view = ListViewState::new();
    view.set_search_term(query.search.unwrap_or_default());
    view.set_filters(filters);
    view.load(&state.repository).await;

    let now = Utc::now();
    let label = state.config.sla_overdue_label();
    let inspections = view
        .visible()
        .into_iter()
        .map(|inspection| InspectionSummary {
            risk_tier: inspection.risk_tier(),
            sla: sla_status_with_label(inspection.sla_deadline, now, label),
            inspection: inspection.clone(),
        })
        .collect::<Vec<_>>();

    Ok(Json(InspectionListResponse {
        total: view.records.len(),
        counts: view.counts(),
        inspections,
        load_error: view.load_error,
    }))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DetailQuery {
    /// Gallery slot to select; empty slots leave the first photo selected
    pub photo: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InspectionDetailResponse {
    #[serde(flatten)]
    pub view: DetailViewState,
    pub gallery: Vec<GallerySlot>,
    pub sla: SlaStatus,
    pub risk_tier: Option<RiskTier>,
}

#[utoipa::path(
    get,
    path = "/api/v0/inspections/{id}",
    tag = "inspections",
    params(
        ("id" = String, Path, description = "Inspection ID"),
        DetailQuery
    ),
    responses(
        (status = 200, description = "Inspection with damages, photos and consent", body = InspectionDetailResponse),
        (status = 404, description = "Inspection not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(inspection_id = %id, operation = "get_inspection"))]
pub async fn get_inspection(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<DetailQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let mut controller = load_detail(&state, &id).await?;
    if let Some(slot) = query.photo {
        controller.select_slot(slot);
    }

    let view = controller.into_state();
    Ok(Json(InspectionDetailResponse {
        gallery: view.gallery(),
        sla: view.sla(Utc::now(), state.config.sla_overdue_label()),
        risk_tier: view.inspection.as_ref().map(Inspection::risk_tier),
        view,
    }))
}
