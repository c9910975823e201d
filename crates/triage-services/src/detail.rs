//! Detail workflow controller
//!
//! Drives a single inspection review through `Loading -> Ready -> Saving -> Done|Error`.
//! Loads are tagged with a [`LoadTicket`] so a response for a view that has since
//! been reloaded is dropped. Damage approvals are commands applied optimistically
//! and rolled back when the write fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use triage_core::models::{
    Consent, Damage, DamageApproval, Inspection, InspectionStatus, Photo, GALLERY_SLOTS,
};
use triage_core::{sla_status_with_label, AppError, ErrorMetadata, SlaStatus};
use triage_db::InspectionRepository;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::report::InspectionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DetailPhase {
    Loading,
    Ready,
    Saving,
    Done,
    Error,
    /// The inspection is absent or could not be read
    NotFound,
}

/// Terminal reviewer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    RequestReinspection,
    Escalate,
}

impl ReviewDecision {
    pub fn target_status(&self) -> InspectionStatus {
        match self {
            ReviewDecision::Approve => InspectionStatus::Approved,
            ReviewDecision::RequestReinspection => InspectionStatus::NeedsReinspection,
            ReviewDecision::Escalate => InspectionStatus::Rejected,
        }
    }
}

impl Display for ReviewDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ReviewDecision::Approve => write!(f, "approve"),
            ReviewDecision::RequestReinspection => write!(f, "request_reinspection"),
            ReviewDecision::Escalate => write!(f, "escalate"),
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(ReviewDecision::Approve),
            "request_reinspection" | "reinspect" | "reinspection" => {
                Ok(ReviewDecision::RequestReinspection)
            }
            "escalate" => Ok(ReviewDecision::Escalate),
            _ => Err(anyhow::anyhow!("Invalid review decision: {}", s)),
        }
    }
}

/// Identifies one load of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub inspection_id: String,
}

/// Everything fetched for one load, successful or not.
pub struct LoadedDetail {
    pub ticket: LoadTicket,
    pub inspection: Result<Inspection, AppError>,
    pub damages: Result<Vec<Damage>, AppError>,
    pub photos: Result<Vec<Photo>, AppError>,
    pub consent: Result<Option<Consent>, AppError>,
}

/// Fetch the inspection and its evidence concurrently.
#[tracing::instrument(skip(repository), fields(inspection_id = %ticket.inspection_id, generation = ticket.generation))]
pub async fn fetch_detail(repository: &InspectionRepository, ticket: LoadTicket) -> LoadedDetail {
    let id = ticket.inspection_id.as_str();
    let (inspection, damages, photos, consent) = tokio::join!(
        repository.get_inspection(id),
        repository.list_damages(id),
        repository.list_photos(id),
        repository.get_consent(id),
    );

    LoadedDetail {
        ticket,
        inspection,
        damages,
        photos,
        consent,
    }
}

/// A per-damage approval write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DamageApprovalCommand {
    pub damage_id: String,
    pub desired: bool,
    pub idempotency_key: Uuid,
}

impl DamageApprovalCommand {
    pub fn new(damage_id: impl Into<String>, desired: bool) -> Self {
        Self {
            damage_id: damage_id.into(),
            desired,
            idempotency_key: Uuid::new_v4(),
        }
    }
}

struct InFlightApproval {
    idempotency_key: Uuid,
    previous: DamageApproval,
}

/// A failure the reviewer has to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FailureNotice {
    pub code: String,
    pub message: String,
    pub recoverable: bool,
}

impl From<&AppError> for FailureNotice {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.client_message(),
            recoverable: err.is_recoverable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GallerySlot {
    Empty,
    Filled {
        index: usize,
        photo: Photo,
        selected: bool,
    },
}

/// State of one inspection detail screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetailViewState {
    pub generation: u64,
    pub phase: DetailPhase,
    pub inspection: Option<Inspection>,
    pub damages: Vec<Damage>,
    /// In gallery display order
    pub photos: Vec<Photo>,
    pub consent: Option<Consent>,
    pub selected_photo_index: usize,
    pub review_notes_draft: String,
    pub last_failure: Option<FailureNotice>,
    /// Evidence collections that failed to load and are shown empty
    pub missing_evidence: Vec<String>,
}

impl DetailViewState {
    fn loading(generation: u64) -> Self {
        Self {
            generation,
            phase: DetailPhase::Loading,
            inspection: None,
            damages: Vec::new(),
            photos: Vec::new(),
            consent: None,
            selected_photo_index: 0,
            review_notes_draft: String::new(),
            last_failure: None,
            missing_evidence: Vec::new(),
        }
    }

    /// Photos reachable through the gallery.
    pub fn photo_count(&self) -> usize {
        self.photos.len().min(GALLERY_SLOTS)
    }

    pub fn selected_photo(&self) -> Option<&Photo> {
        self.photos
            .get(self.selected_photo_index)
            .filter(|_| self.selected_photo_index < GALLERY_SLOTS)
    }

    pub fn gallery(&self) -> Vec<GallerySlot> {
        (0..GALLERY_SLOTS)
            .map(|index| match self.photos.get(index) {
                Some(photo) => GallerySlot::Filled {
                    index,
                    photo: photo.clone(),
                    selected: index == self.selected_photo_index,
                },
                None => GallerySlot::Empty,
            })
            .collect()
    }

    pub fn sla(&self, now: DateTime<Utc>, overdue_label: &str) -> SlaStatus {
        let deadline = self.inspection.as_ref().and_then(|i| i.sla_deadline);
        sla_status_with_label(deadline, now, overdue_label)
    }

    /// Report of the inspection as currently shown, with the notes draft in place
    /// of the persisted notes.
    pub fn report(&self) -> Option<InspectionReport> {
        let mut inspection = self.inspection.clone()?;
        if !self.review_notes_draft.is_empty() {
            inspection.review_notes = Some(self.review_notes_draft.clone());
        }
        Some(InspectionReport::from_snapshot(&inspection, &self.damages))
    }

    fn is_interactive(&self) -> bool {
        matches!(self.phase, DetailPhase::Ready | DetailPhase::Error)
    }
}

pub struct DetailController {
    repository: InspectionRepository,
    state: DetailViewState,
    in_flight: HashMap<String, InFlightApproval>,
    /// Why the last load ended in `NotFound`
    load_error: Option<AppError>,
}

impl DetailController {
    pub fn new(repository: InspectionRepository) -> Self {
        Self {
            repository,
            state: DetailViewState::loading(0),
            in_flight: HashMap::new(),
            load_error: None,
        }
    }

    pub fn state(&self) -> &DetailViewState {
        &self.state
    }

    pub fn into_state(self) -> DetailViewState {
        self.state
    }

    /// The primary lookup failure behind a `NotFound` phase. A missing record and
    /// an unreachable datastore both display as not found; callers that write need
    /// to tell them apart.
    pub fn load_error(&self) -> Option<&AppError> {
        self.load_error.as_ref()
    }

    /// Load (or reload) `inspection_id` and apply the result.
    pub async fn load(&mut self, inspection_id: &str) -> &DetailViewState {
        let ticket = self.begin_load(inspection_id);
        let loaded = fetch_detail(&self.repository, ticket).await;
        self.apply_load(loaded);
        &self.state
    }

    /// Start a new generation. Any response for an earlier ticket will be discarded.
    pub fn begin_load(&mut self, inspection_id: &str) -> LoadTicket {
        let generation = self.state.generation + 1;
        self.state = DetailViewState::loading(generation);
        self.in_flight.clear();
        self.load_error = None;

        LoadTicket {
            generation,
            inspection_id: inspection_id.to_string(),
        }
    }

    /// Apply a fetched detail. Returns `false` when the ticket is stale.
    pub fn apply_load(&mut self, loaded: LoadedDetail) -> bool {
        if loaded.ticket.generation != self.state.generation {
            tracing::debug!(
                stale = loaded.ticket.generation,
                current = self.state.generation,
                "Discarding stale detail response"
            );
            return false;
        }

        let inspection = match loaded.inspection {
            Ok(inspection) => inspection,
            Err(e) => {
                if e.is_not_found() {
                    tracing::debug!(inspection_id = %loaded.ticket.inspection_id, "Inspection not found");
                } else {
                    tracing::warn!(inspection_id = %loaded.ticket.inspection_id, error = %e, "Failed to load inspection");
                }
                self.state.phase = DetailPhase::NotFound;
                self.load_error = Some(e);
                return true;
            }
        };

        let mut missing_evidence = Vec::new();
        let damages = loaded.damages.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load damages, showing none");
            missing_evidence.push("damages".to_string());
            Vec::new()
        });
        let mut photos = loaded.photos.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load photos, showing none");
            missing_evidence.push("photos".to_string());
            Vec::new()
        });
        photos.sort_by(Photo::display_order);
        let consent = loaded.consent.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load consent");
            missing_evidence.push("consent".to_string());
            None
        });

        self.state.review_notes_draft = inspection.review_notes.clone().unwrap_or_default();
        self.state.inspection = Some(inspection);
        self.state.damages = damages;
        self.state.photos = photos;
        self.state.consent = consent;
        self.state.selected_photo_index = 0;
        self.state.missing_evidence = missing_evidence;
        self.state.phase = DetailPhase::Ready;
        true
    }

    pub fn next_photo(&mut self) {
        if self.state.selected_photo_index + 1 < self.state.photo_count() {
            self.state.selected_photo_index += 1;
        }
    }

    pub fn previous_photo(&mut self) {
        self.state.selected_photo_index = self.state.selected_photo_index.saturating_sub(1);
    }

    /// Jump to a gallery slot. Empty slots are ignored. Returns whether the selection moved.
    pub fn select_slot(&mut self, slot: usize) -> bool {
        if slot < self.state.photo_count() {
            self.state.selected_photo_index = slot;
            true
        } else {
            false
        }
    }

    pub fn set_review_notes(&mut self, notes: impl Into<String>) {
        self.state.review_notes_draft = notes.into();
    }

    /// Apply an approval locally and return the command to send.
    pub fn stage_damage_approval(
        &mut self,
        damage_id: &str,
        approved: bool,
    ) -> Result<DamageApprovalCommand, AppError> {
        if !self.state.is_interactive() {
            return Err(AppError::InvalidInput(format!(
                "Damages cannot be judged while the view is {:?}",
                self.state.phase
            )));
        }

        let damage = self
            .state
            .damages
            .iter_mut()
            .find(|d| d.id == damage_id)
            .ok_or_else(|| AppError::NotFound(format!("Damage {} not found", damage_id)))?;

        let command = DamageApprovalCommand::new(damage_id, approved);
        let previous = std::mem::replace(&mut damage.approval, DamageApproval::from(approved));

        // A newer toggle keeps the rollback target of the oldest unacknowledged one.
        let previous = self
            .in_flight
            .get(damage_id)
            .map(|pending| pending.previous)
            .unwrap_or(previous);
        self.in_flight.insert(
            damage_id.to_string(),
            InFlightApproval {
                idempotency_key: command.idempotency_key,
                previous,
            },
        );

        Ok(command)
    }

    /// Settle a command. On failure the local value is rolled back unless a newer
    /// command for the same damage is still outstanding, and the failure is recorded.
    pub fn acknowledge_damage_approval(
        &mut self,
        command: &DamageApprovalCommand,
        outcome: Result<(), AppError>,
    ) -> Result<(), AppError> {
        let is_latest = self
            .in_flight
            .get(&command.damage_id)
            .is_some_and(|pending| pending.idempotency_key == command.idempotency_key);

        match outcome {
            Ok(()) => {
                if is_latest {
                    self.in_flight.remove(&command.damage_id);
                } else if let Some(pending) = self.in_flight.get_mut(&command.damage_id) {
                    pending.previous = DamageApproval::from(command.desired);
                }
                Ok(())
            }
            Err(e) => {
                let failure = AppError::write_failure(format!("damage {}", command.damage_id), &e);
                tracing::warn!(
                    damage_id = %command.damage_id,
                    idempotency_key = %command.idempotency_key,
                    error = %e,
                    "Damage approval was not saved"
                );

                if is_latest {
                    if let Some(pending) = self.in_flight.remove(&command.damage_id) {
                        if let Some(damage) = self
                            .state
                            .damages
                            .iter_mut()
                            .find(|d| d.id == command.damage_id)
                        {
                            damage.approval = pending.previous;
                        }
                    }
                }

                self.state.last_failure = Some(FailureNotice::from(&failure));
                Err(failure)
            }
        }
    }

    /// Approve or reject one damage and persist it immediately.
    pub async fn set_damage_approval(&mut self, damage_id: &str, approved: bool) -> Result<(), AppError> {
        let command = self.stage_damage_approval(damage_id, approved)?;
        let outcome = self
            .repository
            .set_damage_approval(&command.damage_id, command.desired)
            .await;
        self.acknowledge_damage_approval(&command, outcome)
    }

    /// Persist a terminal decision with the current notes draft.
    ///
    /// On success the view is `Done` and the local inspection reflects the new status.
    /// On failure the view is `Error`, nothing is applied locally, and another
    /// decision may be submitted.
    pub async fn submit_decision(&mut self, decision: ReviewDecision) -> Result<(), AppError> {
        if !self.state.is_interactive() {
            return Err(AppError::InvalidInput(format!(
                "A decision cannot be submitted while the view is {:?}",
                self.state.phase
            )));
        }
        let inspection_id = match &self.state.inspection {
            Some(inspection) => inspection.id.clone(),
            None => {
                return Err(AppError::Internal(
                    "Interactive view has no inspection".to_string(),
                ))
            }
        };

        let notes = self.state.review_notes_draft.clone();
        let status = decision.target_status();
        self.state.phase = DetailPhase::Saving;

        match self
            .repository
            .set_inspection_status(&inspection_id, status, &notes)
            .await
        {
            Ok(updated_at) => {
                if let Some(inspection) = self.state.inspection.as_mut() {
                    inspection.status = status;
                    inspection.review_notes = Some(notes);
                    inspection.updated_at = updated_at;
                }
                self.state.last_failure = None;
                self.state.phase = DetailPhase::Done;
                tracing::info!(inspection_id = %inspection_id, decision = %decision, "Decision recorded");
                Ok(())
            }
            Err(e) => {
                let failure = AppError::write_failure(format!("inspection {}", inspection_id), &e);
                tracing::warn!(inspection_id = %inspection_id, decision = %decision, error = %e, "Decision was not saved");
                self.state.last_failure = Some(FailureNotice::from(&failure));
                self.state.phase = DetailPhase::Error;
                Err(failure)
            }
        }
    }
}
