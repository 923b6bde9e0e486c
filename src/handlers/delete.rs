use crate::error::{ApiError, ErrorResponse};
use crate::note_id::NoteId;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode};

/// DELETE /api/notes/:id handler - Remove a note
///
/// Answers 204 whether or not the note existed.
#[utoipa::path(
    delete,
    path = routes::NOTE_ITEM,
    params(
        ("id" = String, Path, description = "24-character hex note id")
    ),
    responses(
        (status = 204, description = "Note deleted or already absent"),
        (status = 400, description = "Malformatted id", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: NoteId = id_str.parse()?;

    state.store.delete(id).await?;

    tracing::info!("Deleted note with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
