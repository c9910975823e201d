//! Triage Services Layer
//!
//! Review workflow on top of the repository: the list/filter engine, the detail
//! workflow controller, and the report formatter. Keep HTTP and terminal concerns
//! in triage-api and triage-cli.

pub mod detail;
pub mod list;
pub mod report;

pub use detail::{
    fetch_detail, DamageApprovalCommand, DetailController, DetailPhase, DetailViewState,
    FailureNotice, GallerySlot, LoadTicket, LoadedDetail, ReviewDecision,
};
pub use list::{
    aggregate_counts, filter_inspections, matches_search, Filter, InspectionFilters,
    ListViewState, StatusCounts,
};
pub use report::{InspectionReport, PAGE_HEIGHT, PAGE_WIDTH};
