use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::load_detail;
use crate::state::AppState;
use axum::{
    extract::rejection::QueryRejection,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::AppError;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// `json` (pages as an array) or `text` (form-feed separated pages)
    pub format: Option<ReportFormat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub inspection_id: String,
    pub page_count: usize,
    pub pages: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/inspections/{id}/report",
    tag = "inspections",
    params(
        ("id" = String, Path, description = "Inspection ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Rendered report", body = ReportResponse),
        (status = 404, description = "Inspection not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(inspection_id = %id, operation = "render_report"))]
pub async fn get_report(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, HttpAppError> {
    let Query(query) = query?;
    let controller = load_detail(&state, &id).await?;
    let report = controller
        .state()
        .report()
        .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))?;

    match query.format.unwrap_or_default() {
        ReportFormat::Text => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report.render_text(),
        )
            .into_response()),
        ReportFormat::Json => {
            let pages = report.render();
            Ok(Json(ReportResponse {
                inspection_id: report.inspection_id,
                page_count: pages.len(),
                pages,
            })
            .into_response())
        }
    }
}
