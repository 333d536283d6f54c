//! Unified error handling
//!
//! Two layers:
//! - [`crate::orders::FlowError`] - domain taxonomy raised by the ledger,
//!   registry and coordinator
//! - [`AppError`] - HTTP-facing error with status code and stable error code
//!
//! # Error code scheme
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E0xxx  | Business / validation | E0003 not found |
//! | E2xxx  | Authorization | E2001 permission denied |
//! | E3xxx  | Authentication | E3001 missing identity |
//! | E9xxx  | System | E9002 storage error |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::orders::FlowError;

/// Error response envelope
///
/// Success responses are the bare resource as JSON; failures share this
/// shape:
///
/// ```json
/// {
///   "code": "E0003",
///   "message": "Resource not found: Order 7"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Stable error code
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Identity errors (4xx) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "E3001",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.clone()),
            AppError::Database(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::ItemUnavailable(_) => AppError::BusinessRule(err.to_string()),
            FlowError::InvalidTransition { .. } => AppError::BusinessRule(err.to_string()),
            FlowError::TableHasActiveOrders(_) => AppError::Conflict(err.to_string()),
            FlowError::NotFound(msg) => AppError::NotFound(msg),
            FlowError::Conflict(msg) => AppError::Conflict(msg),
            FlowError::Forbidden(msg) => AppError::Forbidden(msg),
            FlowError::Validation(msg) => AppError::Validation(msg),
            FlowError::Storage(msg) => AppError::Database(msg),
        }
    }
}

/// Result alias for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_carries_code_and_omits_empty_data() {
        let body = serde_json::to_value(AppResponse::<()> {
            code: "E0003".into(),
            message: "Resource not found: Order 7".into(),
            data: None,
        })
        .unwrap();
        assert_eq!(body["code"], "E0003");
        assert_eq!(body["message"], "Resource not found: Order 7");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn flow_errors_map_to_http_categories() {
        let err: AppError = FlowError::ItemUnavailable(7).into();
        assert!(matches!(err, AppError::BusinessRule(_)));

        let err: AppError = FlowError::TableHasActiveOrders(5).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = FlowError::NotFound("order 1".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = FlowError::Storage("lock poisoned".into()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
