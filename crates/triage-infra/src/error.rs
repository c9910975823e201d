//! HTTP error body
//!
//! `IntoResponse` for `AppError` lives in triage-api: neither the trait nor the
//! type is local to this crate.

use serde::{Deserialize, Serialize};
use triage_core::{AppError, ErrorMetadata};
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable code, e.g. "WRITE_FAILURE"
    pub code: String,
    /// Whether submitting the same request again may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    /// Build the body for `err`. Internal details are withheld for sensitive
    /// errors in production.
    pub fn from_app_error(err: &AppError, is_production: bool) -> Self {
        let details = if is_production && err.is_sensitive() {
            None
        } else {
            Some(err.detailed_message())
        };

        Self {
            error: err.client_message(),
            details,
            error_type: Some(err.error_type().to_string()),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(str::to_string),
        }
    }
}
