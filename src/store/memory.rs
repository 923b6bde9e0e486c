use anyhow::{anyhow, Result};
use std::sync::{Arc, RwLock};

use crate::models::{Note, NoteDraft};
use crate::note_id::NoteId;

/// Process-local note storage
///
/// Nothing survives a restart. Notes are kept in insertion order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    notes: Arc<RwLock<Vec<Note>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, draft: NoteDraft) -> Result<Note> {
        let note = draft.into_note(NoteId::generate());
        let mut notes = self.notes.write().map_err(|_| anyhow!("note store lock poisoned"))?;
        notes.push(note.clone());
        tracing::debug!("Inserted note with id: {}", note.id);
        Ok(note)
    }

    pub fn read(&self, id: NoteId) -> Result<Option<Note>> {
        let notes = self.notes.read().map_err(|_| anyhow!("note store lock poisoned"))?;
        Ok(notes.iter().find(|note| note.id == id).cloned())
    }

    pub fn list(&self) -> Result<Vec<Note>> {
        let notes = self.notes.read().map_err(|_| anyhow!("note store lock poisoned"))?;
        Ok(notes.clone())
    }

    /// Fails once a writer has panicked while holding the lock
    pub fn health_check(&self) -> Result<()> {
        self.notes
            .read()
            .map(|_| ())
            .map_err(|_| anyhow!("note store lock poisoned"))
    }

    /// Returns whether a note was removed
    pub fn delete(&self, id: NoteId) -> Result<bool> {
        let mut notes = self.notes.write().map_err(|_| anyhow!("note store lock poisoned"))?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        Ok(notes.len() != before)
    }
}

#[cfg(test)]
impl MemoryStore {
    /// A store whose lock was abandoned by a panicking writer
    pub(crate) fn poisoned() -> Self {
        let store = MemoryStore::new();
        let notes = Arc::clone(&store.notes);
        let _ = std::thread::spawn(move || {
            let _guard = notes.write().unwrap();
            panic!("writer died while holding the note store lock");
        })
        .join();
        store
    }
}
