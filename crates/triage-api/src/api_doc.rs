//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use triage_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Triage API",
        version = "0.1.0",
        description = "Review console for vehicle insurance inspections: browse and filter inspections, open one with its damages, photos and consent, judge damages, record a decision, and render a printable report. Endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::health::health_check,
        handlers::inspections::list_inspections,
        handlers::inspections::get_inspection,
        handlers::decisions::submit_decision,
        handlers::damages::set_damage_approval,
        handlers::reports::get_report,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::Inspection,
            models::InspectionStatus,
            models::PolicyType,
            models::PolicyStatus,
            models::RiskTier,
            models::Damage,
            models::DamageSeverity,
            models::DamageApproval,
            models::Photo,
            models::Consent,
            triage_core::SlaStatus,
            triage_services::StatusCounts,
            triage_services::DetailPhase,
            triage_services::DetailViewState,
            triage_services::GallerySlot,
            triage_services::FailureNotice,
            triage_services::ReviewDecision,
            handlers::health::HealthResponse,
            handlers::inspections::InspectionSummary,
            handlers::inspections::InspectionListResponse,
            handlers::inspections::InspectionDetailResponse,
            handlers::decisions::DecisionRequest,
            handlers::decisions::DecisionResponse,
            handlers::damages::DamageApprovalRequest,
            handlers::damages::DamageApprovalResponse,
            handlers::reports::ReportFormat,
            handlers::reports::ReportResponse,
        )
    ),
    tags(
        (name = "health", description = "Service and datastore health"),
        (name = "inspections", description = "Inspection list, detail and reports"),
        (name = "review", description = "Reviewer decisions and damage judgments")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_review_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v0/inspections",
            "/api/v0/inspections/{id}",
            "/api/v0/inspections/{id}/decision",
            "/api/v0/inspections/{id}/report",
            "/api/v0/damages/{id}/approval",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
