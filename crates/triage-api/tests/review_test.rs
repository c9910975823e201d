//! Decision and damage approval API tests.
//!
//! Run with: `cargo test -p triage-api --test review_test`

mod helpers;

use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};
use triage_core::models::{DamageApproval, InspectionStatus};
use triage_db::test_helpers::{sample_damage, sample_inspection, GatewayOperation, InMemoryGateway};

const ID: &str = "INS-2025-DEF456";

fn seeded() -> InMemoryGateway {
    InMemoryGateway::new()
        .with_inspection(sample_inspection(ID))
        .with_damage(sample_damage("3", ID))
}

#[tokio::test]
async fn test_escalate_with_notes_persists_rejected() {
    let app = setup_test_app(seeded());

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "escalate", "review_notes": "missing photos" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "rejected");

    let detail: Value = app
        .client()
        .get(&api_path(&format!("/inspections/{}", ID)))
        .await
        .json();
    assert_eq!(detail["inspection"]["status"], "rejected");
    assert_eq!(detail["inspection"]["review_notes"], "missing photos");
    assert_eq!(detail["review_notes_draft"], "missing photos");
}

#[tokio::test]
async fn test_decision_targets() {
    for (decision, status) in [
        ("approve", InspectionStatus::Approved),
        ("request_reinspection", InspectionStatus::NeedsReinspection),
        ("escalate", InspectionStatus::Rejected),
    ] {
        let app = setup_test_app(seeded());
        let response = app
            .client()
            .post(&api_path(&format!("/inspections/{}/decision", ID)))
            .json(&json!({ "decision": decision }))
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(app.gateway.inspection(ID).unwrap().status, status);
    }
}

#[tokio::test]
async fn test_decision_without_notes_keeps_persisted_notes() {
    let mut inspection = sample_inspection(ID);
    inspection.review_notes = Some("checked chassis number".to_string());
    let app = setup_test_app(InMemoryGateway::new().with_inspection(inspection));

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        app.gateway.inspection(ID).unwrap().review_notes.as_deref(),
        Some("checked chassis number")
    );
}

#[tokio::test]
async fn test_failed_decision_is_surfaced_and_not_applied() {
    let gateway = seeded();
    gateway.fail_on(GatewayOperation::UpdateInspectionStatus);
    let app = setup_test_app(gateway);

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "approve", "review_notes": "ok" }))
        .await;
    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "WRITE_FAILURE");
    assert_eq!(body["recoverable"], true);
    assert_eq!(
        app.gateway.inspection(ID).unwrap().status,
        InspectionStatus::Pending
    );
    assert_eq!(
        app.gateway.call_count(GatewayOperation::UpdateInspectionStatus),
        1
    );
}

#[tokio::test]
async fn test_decision_on_unknown_inspection_is_404() {
    let app = setup_test_app(seeded());

    let response = app
        .client()
        .post(&api_path("/inspections/INS-NOPE/decision"))
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_decision_during_lookup_outage_is_retryable() {
    let gateway = seeded();
    gateway.fail_on(GatewayOperation::SelectInspection);
    let app = setup_test_app(gateway);

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "WRITE_FAILURE");
    assert_eq!(body["recoverable"], true);
    assert_eq!(
        app.gateway.call_count(GatewayOperation::UpdateInspectionStatus),
        0
    );

    app.gateway.clear_failures();
    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "approve" }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        app.gateway.inspection(ID).unwrap().status,
        InspectionStatus::Approved
    );
}

#[tokio::test]
async fn test_unknown_decision_is_400() {
    let app = setup_test_app(seeded());

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "shrug" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_overlong_notes_are_rejected() {
    let app = setup_test_app(seeded());

    let response = app
        .client()
        .post(&api_path(&format!("/inspections/{}/decision", ID)))
        .json(&json!({ "decision": "approve", "review_notes": "x".repeat(4001) }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        app.gateway.call_count(GatewayOperation::UpdateInspectionStatus),
        0
    );
}

#[tokio::test]
async fn test_approve_then_reject_damage_last_write_wins() {
    let app = setup_test_app(seeded());
    let path = api_path("/damages/3/approval");

    let response = app
        .client()
        .put(&path)
        .json(&json!({ "approved": true }))
        .await;
    assert_eq!(response.status_code(), 200);
    let response = app
        .client()
        .put(&path)
        .json(&json!({ "approved": false }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["approval"], "rejected");

    assert_eq!(
        app.gateway.damage("3").unwrap().approval,
        DamageApproval::Rejected
    );
}

#[tokio::test]
async fn test_damage_approval_twice_is_idempotent() {
    let app = setup_test_app(seeded());
    let path = api_path("/damages/3/approval");

    for _ in 0..2 {
        let response = app
            .client()
            .put(&path)
            .json(&json!({ "approved": true }))
            .await;
        assert_eq!(response.status_code(), 200);
    }
    assert_eq!(
        app.gateway.damage("3").unwrap().approval,
        DamageApproval::Approved
    );
}

#[tokio::test]
async fn test_failed_damage_approval_is_write_failure() {
    let gateway = seeded();
    gateway.fail_on(GatewayOperation::UpdateDamageApproval);
    let app = setup_test_app(gateway);

    let response = app
        .client()
        .put(&api_path("/damages/3/approval"))
        .json(&json!({ "approved": true }))
        .await;
    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "WRITE_FAILURE");
    assert_eq!(
        app.gateway.damage("3").unwrap().approval,
        DamageApproval::Unjudged
    );
}

#[tokio::test]
async fn test_unknown_damage_is_write_failure() {
    let app = setup_test_app(seeded());

    let response = app
        .client()
        .put(&api_path("/damages/999/approval"))
        .json(&json!({ "approved": true }))
        .await;
    assert_eq!(response.status_code(), 502);
}
