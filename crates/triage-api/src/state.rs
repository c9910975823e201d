//! Application state shared by every handler.

use triage_core::Config;
use triage_db::InspectionRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: InspectionRepository,
    pub config: Config,
}

impl AppState {
    pub fn new(repository: InspectionRepository, config: Config) -> Self {
        Self { repository, config }
    }
}
