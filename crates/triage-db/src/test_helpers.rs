//! In-memory gateway for testing
//!
//! Lets the services and API crates run their workflows without a datastore.
//! Any operation can be made to fail with [`InMemoryGateway::fail_on`].

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use triage_core::models::{
    Consent, Damage, DamageApproval, DamageSeverity, Inspection, InspectionStatus, Photo,
    PolicyStatus, PolicyType,
};
use triage_core::AppError;

use crate::traits::InspectionGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    SelectInspections,
    SelectInspection,
    SelectDamages,
    SelectPhotos,
    SelectConsent,
    UpdateInspectionStatus,
    UpdateDamageApproval,
    Ping,
}

#[derive(Default)]
struct Store {
    inspections: Vec<Inspection>,
    damages: Vec<Damage>,
    photos: Vec<Photo>,
    consents: Vec<Consent>,
    failing: HashSet<GatewayOperation>,
    calls: HashMap<GatewayOperation, usize>,
}

/// Gateway backed by vectors behind a mutex. Clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    store: Arc<Mutex<Store>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inspection(self, inspection: Inspection) -> Self {
        self.add_inspection(inspection);
        self
    }

    pub fn with_damage(self, damage: Damage) -> Self {
        self.add_damage(damage);
        self
    }

    pub fn with_photo(self, photo: Photo) -> Self {
        self.add_photo(photo);
        self
    }

    pub fn with_consent(self, consent: Consent) -> Self {
        self.add_consent(consent);
        self
    }

    pub fn add_inspection(&self, inspection: Inspection) {
        self.store.lock().unwrap().inspections.push(inspection);
    }

    pub fn add_damage(&self, damage: Damage) {
        self.store.lock().unwrap().damages.push(damage);
    }

    pub fn add_photo(&self, photo: Photo) {
        self.store.lock().unwrap().photos.push(photo);
    }

    pub fn add_consent(&self, consent: Consent) {
        self.store.lock().unwrap().consents.push(consent);
    }

    /// Make every later call to `operation` return a gateway error.
    pub fn fail_on(&self, operation: GatewayOperation) {
        self.store.lock().unwrap().failing.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.store.lock().unwrap().failing.clear();
    }

    /// Number of times `operation` was attempted, failed attempts included.
    pub fn call_count(&self, operation: GatewayOperation) -> usize {
        self.store
            .lock()
            .unwrap()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn inspection(&self, id: &str) -> Option<Inspection> {
        self.store
            .lock()
            .unwrap()
            .inspections
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    pub fn damage(&self, id: &str) -> Option<Damage> {
        self.store
            .lock()
            .unwrap()
            .damages
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    fn enter(&self, operation: GatewayOperation) -> Result<std::sync::MutexGuard<'_, Store>, AppError> {
        let mut store = self.store.lock().unwrap();
        *store.calls.entry(operation).or_insert(0) += 1;
        if store.failing.contains(&operation) {
            return Err(AppError::Gateway(format!(
                "Injected failure for {:?}",
                operation
            )));
        }
        Ok(store)
    }
}

#[async_trait]
impl InspectionGateway for InMemoryGateway {
    async fn select_inspections(&self) -> Result<Vec<Inspection>, AppError> {
        let store = self.enter(GatewayOperation::SelectInspections)?;
        Ok(store.inspections.clone())
    }

    async fn select_inspection(&self, id: &str) -> Result<Option<Inspection>, AppError> {
        let store = self.enter(GatewayOperation::SelectInspection)?;
        Ok(store.inspections.iter().find(|i| i.id == id).cloned())
    }

    async fn select_damages(&self, inspection_id: &str) -> Result<Vec<Damage>, AppError> {
        let store = self.enter(GatewayOperation::SelectDamages)?;
        Ok(store
            .damages
            .iter()
            .filter(|d| d.inspection_id == inspection_id)
            .cloned()
            .collect())
    }

    async fn select_photos(&self, inspection_id: &str) -> Result<Vec<Photo>, AppError> {
        let store = self.enter(GatewayOperation::SelectPhotos)?;
        Ok(store
            .photos
            .iter()
            .filter(|p| p.inspection_id == inspection_id)
            .cloned()
            .collect())
    }

    async fn select_consent(&self, inspection_id: &str) -> Result<Option<Consent>, AppError> {
        let store = self.enter(GatewayOperation::SelectConsent)?;
        Ok(store
            .consents
            .iter()
            .filter(|c| c.inspection_id == inspection_id)
            .max_by_key(|c| c.accepted_at)
            .cloned())
    }

    async fn update_inspection_status(
        &self,
        id: &str,
        status: InspectionStatus,
        review_notes: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut store = self.enter(GatewayOperation::UpdateInspectionStatus)?;
        match store.inspections.iter_mut().find(|i| i.id == id) {
            Some(inspection) => {
                inspection.status = status;
                inspection.review_notes = Some(review_notes.to_string());
                inspection.updated_at = updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_damage_approval(&self, damage_id: &str, approved: bool) -> Result<u64, AppError> {
        let mut store = self.enter(GatewayOperation::UpdateDamageApproval)?;
        match store.damages.iter_mut().find(|d| d.id == damage_id) {
            Some(damage) => {
                damage.approval = DamageApproval::from(approved);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.enter(GatewayOperation::Ping)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
}

/// A pending standard-policy inspection with a full client and vehicle profile.
pub fn sample_inspection(id: &str) -> Inspection {
    Inspection {
        id: id.to_string(),
        status: InspectionStatus::Pending,
        policy_type: PolicyType::Standard,
        policy_status: PolicyStatus::InProcess,
        risk_score: 42,
        quality_score: 87,
        sla_deadline: Some(fixture_time() + chrono::Duration::hours(48)),
        client_name: Some("Maria Souza".to_string()),
        client_email: Some("maria.souza@example.com".to_string()),
        client_phone: Some("+55 11 91234-5678".to_string()),
        client_document: Some("123.456.789-00".to_string()),
        vehicle_plate: Some("ABC1D23".to_string()),
        vehicle_make: Some("Fiat".to_string()),
        vehicle_model: Some("Argo".to_string()),
        vehicle_year: Some(2022),
        vehicle_color: Some("Silver".to_string()),
        vehicle_vin: Some("9BD358A1XNYK00001".to_string()),
        tags: vec!["new-client".to_string()],
        client_comments: None,
        review_notes: None,
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

pub fn sample_damage(id: &str, inspection_id: &str) -> Damage {
    Damage {
        id: id.to_string(),
        inspection_id: inspection_id.to_string(),
        part: "Front bumper".to_string(),
        damage_type: "scratch".to_string(),
        severity: DamageSeverity::Minor,
        confidence: 91,
        approval: DamageApproval::Unjudged,
    }
}

pub fn sample_photo(id: &str, inspection_id: &str, slot: Option<i32>) -> Photo {
    Photo {
        id: id.to_string(),
        inspection_id: inspection_id.to_string(),
        url: Some(format!("https://cdn.example.com/photos/{}.jpg", id)),
        category: Some("exterior".to_string()),
        angle: Some("front".to_string()),
        label: Some(format!("Photo {}", id)),
        latitude: Some(-23.5505),
        longitude: Some(-46.6333),
        captured_at: Some(fixture_time()),
        slot,
    }
}

pub fn sample_consent(id: &str, inspection_id: &str) -> Consent {
    Consent {
        id: id.to_string(),
        inspection_id: inspection_id.to_string(),
        person_type: "insured".to_string(),
        accepted: true,
        signature_url: Some(format!("https://cdn.example.com/signatures/{}.png", id)),
        accepted_at: Some(fixture_time()),
    }
}
