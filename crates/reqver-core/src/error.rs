//! Error types for request versioning
//!
//! Two classes of failure exist:
//!
//! - [`ConfigError`] is returned when a component is constructed with an
//!   unusable configuration. These never surface at request time.
//! - [`ApiError`] is a request-time rejection carrying an HTTP status and a
//!   human-readable message. It renders as a JSON error response.

use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Result type alias for request-time operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Structured client error returned by request-time stages
///
/// Provides structured error responses following a consistent JSON format.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Internal details, logged but never rendered
    pub(crate) internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Add internal details (for logging, never part of the response body)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }

    /// Internal details attached with [`ApiError::with_internal`]
    pub fn internal_details(&self) -> Option<&str> {
        self.internal.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
            },
        }
    }
}

/// Construction-time configuration error
///
/// Raised as soon as a matcher, resolver, validator or dispatcher is built
/// with settings it cannot work with.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("You must define at least one supported version to use this middleware.")]
    NoSupportedVersions,

    #[error("You must define at least a vendor prefix to use this middleware.")]
    MissingVendorPrefix,

    #[error("Path prefix `{0}` must end with `/`")]
    InvalidPathPrefix(String),

    #[error("`{0}` is not a valid header name")]
    InvalidHeaderName(String),

    #[error("Supported version `{version}` is not a valid semantic version: {reason}")]
    InvalidSupportedVersion { version: String, reason: String },

    #[error("A default `*` handler is required")]
    MissingDefaultHandler,

    #[error("Handler for version `{0}` registered more than once")]
    DuplicateHandler(String),

    #[error("Failed to compile version pattern: {0}")]
    Pattern(String),

    #[error("Invalid versioning configuration: {0}")]
    Json(#[from] serde_json::Error),
}
