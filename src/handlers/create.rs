use crate::error::{ApiError, ErrorResponse};
use crate::models::{NewNoteRequest, Note, NoteDraft};
use crate::routes;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

/// POST /api/notes handler - Create a note
///
/// The body is validated before anything is written, so a rejected
/// request leaves the store untouched.
#[utoipa::path(
    post,
    path = routes::NOTES,
    request_body = NewNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Missing or empty content, or malformed JSON", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(request) = payload?;
    let draft = NoteDraft::try_from(request).inspect_err(|err| {
        tracing::info!("Rejected note: {}", err);
    })?;

    let note = state.store.create(draft).await?;

    tracing::info!("Created note with id: {}", note.id);
    Ok((StatusCode::CREATED, Json(note)))
}
