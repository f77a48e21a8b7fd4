//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Server is missing something it needs (e.g. an API key)
    #[error("API configuration error")]
    Configuration,

    #[error("Failed to get response from Claude")]
    Upstream(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration | AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let details = match &self {
            AppError::Upstream(details) => Some(details.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}
