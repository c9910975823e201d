//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

pub const API_VERSION: &str = "v0";

/// Versioned prefix for every inspection route
pub const API_PREFIX: &str = "/api/v0";

/// Served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";
