use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::load_detail_for_write;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::models::InspectionStatus;
use triage_core::AppError;
use triage_services::ReviewDecision;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DecisionRequest {
    pub decision: ReviewDecision,
    /// Replaces the persisted notes; omitted keeps them as they are
    #[validate(length(max = 4000))]
    pub review_notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub inspection_id: String,
    pub status: InspectionStatus,
    pub review_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/v0/inspections/{id}/decision",
    tag = "review",
    params(
        ("id" = String, Path, description = "Inspection ID")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 400, description = "Invalid decision", body = ErrorResponse),
        (status = 404, description = "Inspection not found", body = ErrorResponse),
        (status = 502, description = "Decision was not saved", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(inspection_id = %id, decision = %request.decision))]
pub async fn submit_decision(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<DecisionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request
        .validate()
        .map_err(|e| AppError::InvalidInput(format!("Validation failed: {}", e)))?;

    let mut controller = load_detail_for_write(&state, &id).await?;
    if let Some(notes) = request.review_notes {
        controller.set_review_notes(notes);
    }
    controller.submit_decision(request.decision).await?;

    let inspection = controller
        .into_state()
        .inspection
        .ok_or_else(|| AppError::Internal("Decided view has no inspection".to_string()))?;

    Ok(Json(DecisionResponse {
        inspection_id: inspection.id,
        status: inspection.status,
        review_notes: inspection.review_notes,
        updated_at: inspection.updated_at,
    }))
}
