//! Triage API Library
//!
//! HTTP surface of the inspection triage console: list, detail, reviewer decisions,
//! per-damage approvals and printable reports.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
