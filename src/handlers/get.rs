use crate::error::{ApiError, ErrorResponse};
use crate::models::Note;
use crate::note_id::NoteId;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// GET /api/notes/:id handler - Retrieve a single note
#[utoipa::path(
    get,
    path = routes::NOTE_ITEM,
    params(
        ("id" = String, Path, description = "24-character hex note id")
    ),
    responses(
        (status = 200, description = "Note found", body = Note),
        (status = 400, description = "Malformatted id", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let id: NoteId = id_str.parse()?;

    match state.store.get(id).await? {
        Some(note) => {
            tracing::info!("Retrieved note with id: {}", id);
            Ok((StatusCode::OK, Json(note)))
        }
        None => {
            tracing::info!("Note not found with id: {}", id);
            Err(ApiError::NoteNotFound(id))
        }
    }
}
