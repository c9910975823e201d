use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::models::DamageApproval;
use triage_core::AppError;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DamageApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DamageApprovalResponse {
    pub damage_id: String,
    pub approval: DamageApproval,
}

/// Persist one damage judgment. Writing the same value twice is harmless.
#[utoipa::path(
    put,
    path = "/api/v0/damages/{id}/approval",
    tag = "review",
    params(
        ("id" = String, Path, description = "Damage ID")
    ),
    request_body = DamageApprovalRequest,
    responses(
        (status = 200, description = "Approval saved", body = DamageApprovalResponse),
        (status = 502, description = "Approval was not saved", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(damage_id = %id, approved = request.approved))]
pub async fn set_damage_approval(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<DamageApprovalRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .repository
        .set_damage_approval(&id, request.approved)
        .await
        .map_err(|e| AppError::write_failure(format!("damage {}", id), &e))?;

    Ok(Json(DamageApprovalResponse {
        damage_id: id,
        approval: DamageApproval::from(request.approved),
    }))
}
