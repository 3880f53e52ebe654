// ABOUTME: API error type and its HTTP mapping
// ABOUTME: Turns storage and auth failures into status codes with a structured error envelope

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use okrdesk_storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Body, query string, or path that could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    data: Option<()>,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, String>>,
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Convert AppError to appropriate HTTP status code and error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::BadRequest(_) | AppError::MalformedRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Storage(storage_error) => match storage_error {
                StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                StorageError::DuplicateEmail(_) => (StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
                StorageError::DuplicateName(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME"),
                StorageError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                StorageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                StorageError::ConstraintViolation(_) => {
                    (StatusCode::BAD_REQUEST, "CONSTRAINT_VIOLATION")
                }
                StorageError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    fn user_message(&self) -> String {
        match self {
            AppError::Storage(storage_error) => match storage_error {
                StorageError::NotFound(_)
                | StorageError::DuplicateEmail(_)
                | StorageError::DuplicateName(_)
                | StorageError::Validation(_)
                | StorageError::InvalidInput(_)
                | StorageError::InvalidTransition { .. } => storage_error.to_string(),
                StorageError::ConstraintViolation(_) => {
                    "The record violates a data constraint".to_string()
                }
                _ => "An internal server error occurred".to_string(),
            },
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<BTreeMap<String, String>> {
        match self {
            AppError::Storage(StorageError::Validation(errors)) => Some(
                errors
                    .iter()
                    .map(|e| (e.field.clone(), e.message.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.status_and_code();

        if status_code.is_server_error() {
            // Full error stays in the log, clients only see the sanitized message
            error!(
                request_id = %request_id,
                error = %self,
                "Internal server error occurred"
            );
        } else {
            info!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                "API error response"
            );
        }

        let body = ErrorResponse {
            success: false,
            data: None,
            error: ErrorDetail {
                code: error_code,
                message: self.user_message(),
                details: self.details(),
            },
            request_id,
        };

        (status_code, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
