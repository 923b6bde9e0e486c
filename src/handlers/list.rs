use crate::error::{ApiError, ErrorResponse};
use crate::models::Note;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /api/notes handler - List every note
#[utoipa::path(
    get,
    path = routes::NOTES,
    responses(
        (status = 200, description = "All notes", body = Vec<Note>),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Note>>), ApiError> {
    let notes = state.store.list().await?;

    tracing::info!("Listed {} notes", notes.len());
    Ok((StatusCode::OK, Json(notes)))
}
