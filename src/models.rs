use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note_id::NoteId;

/// A persisted note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    /// 24-character hex id assigned by the store
    #[schema(value_type = String, example = "5a3d5da59070081a82a3445c")]
    pub id: NoteId,
    pub content: String,
    pub important: bool,
}

/// Reasons a note cannot be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("content is required")]
    MissingContent,
    #[error("content must not be empty")]
    EmptyContent,
}

/// A validated note that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    content: String,
    important: bool,
}

impl NoteDraft {
    pub fn new(content: Option<String>, important: Option<bool>) -> Result<Self, ValidationError> {
        let content = content.ok_or(ValidationError::MissingContent)?;
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        Ok(NoteDraft {
            content,
            important: important.unwrap_or(false),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn important(&self) -> bool {
        self.important
    }

    /// Attach the id chosen by the store
    pub fn into_note(self, id: NoteId) -> Note {
        Note {
            id,
            content: self.content,
            important: self.important,
        }
    }
}

/// Request body for POST /api/notes
#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NewNoteRequest {
    #[schema(example = "async/await simplifies making async calls")]
    pub content: Option<String>,
    pub important: Option<bool>,
}

impl TryFrom<NewNoteRequest> for NoteDraft {
    type Error = ValidationError;

    fn try_from(request: NewNoteRequest) -> Result<Self, Self::Error> {
        NoteDraft::new(request.content, request.important)
    }
}
