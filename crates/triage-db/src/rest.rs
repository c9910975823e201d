//! HTTP gateway for a PostgREST-style datastore endpoint.
//!
//! Collections map to `{base_url}/rest/v1/{table}`; filters use the
//! `column=eq.value` syntax and ordering uses `order=column.desc`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use triage_core::models::{Consent, Damage, Inspection, InspectionStatus, Photo};
use triage_core::AppError;

use crate::models::{convert_all, ConsentRow, DamageRow, InspectionRow, PhotoRow};
use crate::traits::InspectionGateway;

const REST_PREFIX: &str = "/rest/v1";

/// Gateway speaking the PostgREST dialect with API-key auth.
#[derive(Clone, Debug)]
pub struct RestInspectionGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestInspectionGateway {
    /// No request timeout is configured; requests rely on the transport defaults.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Gateway(format!(
                "Datastore request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query);

        self.send(request)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to parse response as JSON: {}", e)))
    }

    async fn patch(
        &self,
        table: &str,
        id: &str,
        body: serde_json::Value,
    ) -> Result<u64, AppError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&body);

        let touched = self
            .send(request)
            .await?
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to parse response as JSON: {}", e)))?;

        Ok(touched.len() as u64)
    }
}

#[async_trait]
impl InspectionGateway for RestInspectionGateway {
    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select"))]
    async fn select_inspections(&self) -> Result<Vec<Inspection>, AppError> {
        let rows: Vec<InspectionRow> = self
            .select("inspections", &[("order", "created_at.desc".to_string())])
            .await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "inspections", db.operation = "select", db.record_id = %id))]
    async fn select_inspection(&self, id: &str) -> Result<Option<Inspection>, AppError> {
        let rows: Vec<InspectionRow> = self
            .select(
                "inspections",
                &[("id", format!("eq.{}", id)), ("limit", "1".to_string())],
            )
            .await?;
        rows.into_iter().next().map(Inspection::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "select"))]
    async fn select_damages(&self, inspection_id: &str) -> Result<Vec<Damage>, AppError> {
        let rows: Vec<DamageRow> = self
            .select(
                "damages",
                &[("inspection_id", format!("eq.{}", inspection_id))],
            )
            .await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select"))]
    async fn select_photos(&self, inspection_id: &str) -> Result<Vec<Photo>, AppError> {
        let rows: Vec<PhotoRow> = self
            .select(
                "photos",
                &[("inspection_id", format!("eq.{}", inspection_id))],
            )
            .await?;
        Ok(rows.into_iter().map(Photo::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "consents", db.operation = "select"))]
    async fn select_consent(&self, inspection_id: &str) -> Result<Option<Consent>, AppError> {
        let rows: Vec<ConsentRow> = self
            .select(
                "consents",
                &[
                    ("inspection_id", format!("eq.{}", inspection_id)),
                    ("order", "accepted_at.desc.nullslast".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(Consent::from))
    }

    #[tracing::instrument(skip(self, review_notes), fields(db.table = "inspections", db.operation = "update", db.record_id = %id))]
    async fn update_inspection_status(
        &self,
        id: &str,
        status: InspectionStatus,
        review_notes: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        self.patch(
            "inspections",
            id,
            serde_json::json!({
                "status": status,
                "review_notes": review_notes,
                "updated_at": updated_at,
            }),
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "damages", db.operation = "update", db.record_id = %damage_id))]
    async fn update_damage_approval(
        &self,
        damage_id: &str,
        approved: bool,
    ) -> Result<u64, AppError> {
        self.patch(
            "damages",
            damage_id,
            serde_json::json!({ "approved": approved }),
        )
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        let _: Vec<serde_json::Value> = self
            .select("inspections", &[("limit", "1".to_string())])
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InspectionRepository;
    use mockito::{Matcher, Server};
    use std::sync::Arc;
    use triage_core::models::DamageApproval;

    const KEY: &str = "test-key";

    fn gateway(server: &Server) -> RestInspectionGateway {
        RestInspectionGateway::new(&server.url(), KEY.to_string()).unwrap()
    }

    fn inspection_row(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "status": "in_review",
            "policy_type": "premium",
            "policy_status": "issued",
            "risk_score": 130,
            "quality_score": 80,
            "sla_deadline": "2025-03-03T10:00:00Z",
            "client_name": "Carlos Lima",
            "client_email": null,
            "client_phone": null,
            "client_document": null,
            "vehicle_plate": "DEF4G56",
            "vehicle_make": "VW",
            "vehicle_model": "Polo",
            "vehicle_year": 2021,
            "vehicle_color": null,
            "vehicle_vin": null,
            "tags": null,
            "client_comments": "Scratch on the rear door",
            "review_notes": null,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z"
        })
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let gateway =
            RestInspectionGateway::new("https://datastore.example.com/", "key".to_string())
                .unwrap();
        assert_eq!(gateway.base_url(), "https://datastore.example.com");
        assert_eq!(
            gateway.table_url("damages"),
            "https://datastore.example.com/rest/v1/damages"
        );
    }

    #[tokio::test]
    async fn test_select_inspections_query_and_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/inspections")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .match_header("apikey", KEY)
            .match_header("authorization", format!("Bearer {}", KEY).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([inspection_row("INS-1")]).to_string())
            .create_async()
            .await;

        let inspections = gateway(&server).select_inspections().await.unwrap();
        mock.assert_async().await;

        assert_eq!(inspections.len(), 1);
        assert_eq!(inspections[0].status, InspectionStatus::InReview);
        assert_eq!(inspections[0].risk_score, 100);
        assert!(inspections[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_point_lookup_with_no_rows_is_none_then_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/inspections")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.INS-404".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;

        let gateway = gateway(&server);
        assert!(gateway.select_inspection("INS-404").await.unwrap().is_none());

        let repository = InspectionRepository::new(Arc::new(gateway));
        let err = repository.get_inspection("INS-404").await.unwrap_err();
        assert!(err.is_not_found());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_damages_are_filtered_by_inspection() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/damages")
            .match_query(Matcher::UrlEncoded(
                "inspection_id".into(),
                "eq.INS-1".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([{
                    "id": "3",
                    "inspection_id": "INS-1",
                    "part": "Rear door",
                    "type": "dent",
                    "severity": "moderate",
                    "confidence": 77,
                    "approved": null
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let damages = gateway(&server).select_damages("INS-1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(damages[0].damage_type, "dent");
        assert_eq!(damages[0].approval, DamageApproval::Unjudged);
    }

    #[tokio::test]
    async fn test_patch_counts_touched_rows() {
        let mut server = Server::new_async().await;
        let hit = server
            .mock("PATCH", "/rest/v1/damages")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.3".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(serde_json::json!({ "approved": true })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"3"}]"#)
            .create_async()
            .await;
        let miss = server
            .mock("PATCH", "/rest/v1/damages")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.999".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let gateway = gateway(&server);
        assert_eq!(gateway.update_damage_approval("3", true).await.unwrap(), 1);
        assert_eq!(gateway.update_damage_approval("999", true).await.unwrap(), 0);
        hit.assert_async().await;
        miss.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_update_sends_status_notes_and_timestamp() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/inspections")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.INS-1".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "status": "rejected",
                "review_notes": "missing photos"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([inspection_row("INS-1")]).to_string())
            .create_async()
            .await;

        let touched = gateway(&server)
            .update_inspection_status(
                "INS-1",
                InspectionStatus::Rejected,
                "missing photos",
                Utc::now(),
            )
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(touched, 1);
    }

    #[tokio::test]
    async fn test_server_error_is_gateway_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/inspections")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = gateway(&server).select_inspections().await.unwrap_err();
        assert_eq!(err.error_type(), "Gateway");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_unknown_enum_value_is_gateway_error() {
        let mut server = Server::new_async().await;
        let mut row = inspection_row("INS-1");
        row["status"] = serde_json::json!("archived");
        let _mock = server
            .mock("GET", "/rest/v1/inspections")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([row]).to_string())
            .create_async()
            .await;

        let err = gateway(&server).select_inspections().await.unwrap_err();
        assert_eq!(err.error_type(), "Gateway");
    }
}
