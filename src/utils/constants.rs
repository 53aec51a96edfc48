//! Shared constants and invariants

pub const CSRF_TOKEN_PATH: &str = "/api/csrf-token";
pub const CSRF_TOKEN_FIELD: &str = "csrf_token";

/// Prefix of the diagnostic emitted when the bootstrap fails
pub const FETCH_FAILURE_MSG: &str = "Failed to fetch CSRF token:";

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
