use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::ValidationError;
use crate::note_id::{InvalidId, NoteId};

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every request-level failure ends here and is mapped to exactly one
/// status code with a `{ "error": ... }` body. No note data is ever
/// included in an error response.
#[derive(Debug)]
pub enum ApiError {
    /// Note failed validation before persistence
    Validation(ValidationError),
    /// Path id is not a 24-character hex token
    InvalidId(InvalidId),
    /// Well-formed id with no matching note
    NoteNotFound(NoteId),
    /// Request body could not be read as JSON
    JsonError(String),
    /// Database operation error
    DatabaseError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                format!("Note validation failed: {}", err),
            ),
            ApiError::InvalidId(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::NoteNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Note not found: {}", id),
            ),
            ApiError::JsonError(msg) => (
                StatusCode::BAD_REQUEST,
                format!("JSON parse error: {}", msg),
            ),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", err),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<InvalidId> for ApiError {
    fn from(err: InvalidId) -> Self {
        ApiError::InvalidId(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::JsonError(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

/// Fallback for routes that match nothing
pub async fn unknown_endpoint() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "unknown endpoint".to_string(),
        }),
    )
}
