//! API Error Handling
//!
//! Maps orchestration failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::OrchestrationError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// The batch or event could not be handled; the caller retries it whole
    Orchestration(OrchestrationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Orchestration(err) => {
                tracing::error!("Orchestration error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        ApiError::Orchestration(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
