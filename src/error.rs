//! Gateway error types with HTTP status code mapping.
//!
//! [`PinpointError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Server-side failures are logged in full but rendered to clients with a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned to clients for every 5xx response.
pub const GENERIC_INTERNAL_MESSAGE: &str = "internal server error";

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid argument: lat query parameter is required"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
/// | 2000–2999 | Not Found  | 404 Not Found             |
/// | 3000–3999 | Server     | 500 Internal Server Error |
/// | 4000–4999 | Ownership  | 403 Forbidden, 409 Conflict |
#[derive(Debug, thiserror::Error)]
pub enum PinpointError {
    /// Caller supplied missing or malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Shop with the given ID was not found.
    #[error("shop not found: {0}")]
    ShopNotFound(i64),

    /// Product with the given ID was not found.
    #[error("product not found: {0}")]
    ProductNotFound(i64),

    /// Device with the given uid was not found.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Caller named an owner that does not own the record.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A device with the same uid is already registered.
    #[error("device already registered: {0}")]
    DeviceAlreadyRegistered(String),

    /// The data store cannot evaluate geodesic functions (e.g. PostGIS is
    /// not installed). Consumed by the proximity layer to switch to the
    /// haversine strategy; never meant to reach a client.
    #[error("geospatial capability unavailable: {0}")]
    GeoCapabilityUnavailable(String),

    /// Data store failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A query attempt exceeded its deadline.
    #[error("query timed out after {timeout_ms} ms")]
    QueryTimeout {
        /// Configured deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PinpointError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidArgument(_) => 1001,
            Self::ShopNotFound(_) => 2001,
            Self::ProductNotFound(_) => 2002,
            Self::DeviceNotFound(_) => 2003,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::QueryTimeout { .. } => 3002,
            Self::GeoCapabilityUnavailable(_) => 3003,
            Self::Forbidden(_) => 4001,
            Self::DeviceAlreadyRegistered(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::ShopNotFound(_) | Self::ProductNotFound(_) | Self::DeviceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DeviceAlreadyRegistered(_) => StatusCode::CONFLICT,
            Self::GeoCapabilityUnavailable(_)
            | Self::Persistence(_)
            | Self::QueryTimeout { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for [`PinpointError::InvalidArgument`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl IntoResponse for PinpointError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
