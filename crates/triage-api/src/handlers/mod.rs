pub mod damages;
pub mod decisions;
pub mod health;
pub mod inspections;
pub mod reports;

use triage_core::AppError;
use triage_services::{DetailController, DetailPhase, DetailViewState};

use crate::state::AppState;

/// Run the detail load for `id`, mapping the not-found display to a 404.
pub(crate) async fn load_detail(
    state: &AppState,
    id: &str,
) -> Result<DetailController, AppError> {
    let mut controller = DetailController::new(state.repository.clone());
    let loaded: &DetailViewState = controller.load(id).await;

    if loaded.phase == DetailPhase::NotFound {
        return Err(AppError::NotFound(format!("Inspection {} not found", id)));
    }
    Ok(controller)
}

/// Detail load ahead of a write. Only a missing inspection is a 404; a lookup that
/// failed in the datastore means the change was not saved and can be retried.
pub(crate) async fn load_detail_for_write(
    state: &AppState,
    id: &str,
) -> Result<DetailController, AppError> {
    let mut controller = DetailController::new(state.repository.clone());
    if controller.load(id).await.phase != DetailPhase::NotFound {
        return Ok(controller);
    }

    match controller.load_error() {
        Some(e) if !e.is_not_found() => Err(AppError::write_failure(
            format!("inspection {}", id),
            e,
        )),
        _ => Err(AppError::NotFound(format!("Inspection {} not found", id))),
    }
}
