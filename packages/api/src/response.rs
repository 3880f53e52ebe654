// ABOUTME: Shared API response types
// ABOUTME: Provides the success envelope and helpers that route failures through AppError

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 200 with the data, or the error's own status
pub fn ok_or_internal_error<T, E>(result: Result<T, E>, context: &str) -> Response
where
    T: Serialize,
    E: Into<AppError>,
{
    respond(StatusCode::OK, result, context)
}

/// 201 with the data, or the error's own status
pub fn created_or_internal_error<T, E>(result: Result<T, E>, context: &str) -> Response
where
    T: Serialize,
    E: Into<AppError>,
{
    respond(StatusCode::CREATED, result, context)
}

fn respond<T, E>(status: StatusCode, result: Result<T, E>, context: &str) -> Response
where
    T: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(data) => (status, Json(ApiResponse::success(data))).into_response(),
        Err(e) => {
            debug!("{}", context);
            e.into().into_response()
        }
    }
}
