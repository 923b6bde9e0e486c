//! Note persistence.
//!
//! [`NoteStore`] is the only owner of stored notes. It is created once at
//! startup, cloned into every request through `AppState`, and closed after
//! the server has drained.
//!
//! Backends:
//! - [`spanner::SpannerClient`]: Cloud Spanner (or its emulator), the production store
//! - [`memory::MemoryStore`]: process-local storage for tests and throwaway local runs

use anyhow::Result;

use crate::config::{Config, StoreBackend};
use crate::models::{Note, NoteDraft};
use crate::note_id::NoteId;

pub mod memory;
pub mod spanner;

use memory::MemoryStore;
use spanner::SpannerClient;

/// Handle to the note collection
#[derive(Clone)]
pub enum NoteStore {
    Spanner(SpannerClient),
    Memory(MemoryStore),
}

impl NoteStore {
    /// Open the backend selected by the configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        match (config.store_backend, &config.spanner) {
            (StoreBackend::Spanner, Some(settings)) => {
                Ok(NoteStore::Spanner(SpannerClient::from_settings(settings).await?))
            }
            (StoreBackend::Spanner, None) => {
                anyhow::bail!("Spanner backend selected but no Spanner settings were loaded")
            }
            (StoreBackend::Memory, _) => Ok(Self::in_memory()),
        }
    }

    pub fn in_memory() -> Self {
        NoteStore::Memory(MemoryStore::new())
    }

    /// Persist a validated draft and return it with its new id
    pub async fn create(&self, draft: NoteDraft) -> Result<Note> {
        match self {
            NoteStore::Spanner(client) => client.insert(draft).await,
            NoteStore::Memory(store) => store.insert(draft),
        }
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        match self {
            NoteStore::Spanner(client) => client.list().await,
            NoteStore::Memory(store) => store.list(),
        }
    }

    /// `Ok(None)` means the id is well-formed but no note carries it
    pub async fn get(&self, id: NoteId) -> Result<Option<Note>> {
        match self {
            NoteStore::Spanner(client) => client.read(id).await,
            NoteStore::Memory(store) => store.read(id),
        }
    }

    /// Remove a note. Absent ids are not an error.
    pub async fn delete(&self, id: NoteId) -> Result<()> {
        match self {
            NoteStore::Spanner(client) => client.delete(id).await,
            NoteStore::Memory(store) => {
                if !store.delete(id)? {
                    tracing::debug!("Delete of absent note {} was a no-op", id);
                }
                Ok(())
            }
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        match self {
            NoteStore::Spanner(client) => client.health_check().await,
            NoteStore::Memory(store) => store.health_check(),
        }
    }

    pub async fn close(self) {
        match self {
            NoteStore::Spanner(client) => client.close().await,
            NoteStore::Memory(_) => tracing::debug!("Memory store dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(content: &str) -> NoteDraft {
        NoteDraft::new(Some(content.to_string()), None).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_yields_equal_note() {
        let store = NoteStore::in_memory();
        let created = store
            .create(NoteDraft::new(Some("HTML is easy".to_string()), Some(true)).unwrap())
            .await
            .unwrap();

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_list_tracks_creates_and_deletes() {
        let store = NoteStore::in_memory();
        let first = store.create(draft("HTML is easy")).await.unwrap();
        store.create(draft("Browser can execute only JavaScript")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.delete(first.id).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        store.delete(first.id).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = NoteStore::in_memory();
        let deleted = store.create(draft("HTML is easy")).await.unwrap();
        store.delete(deleted.id).await.unwrap();

        let next = store.create(draft("HTML is easy")).await.unwrap();
        assert_ne!(next.id, deleted.id);
        assert_eq!(store.get(deleted.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let config = Config {
            store_backend: StoreBackend::Memory,
            spanner: None,
            service_port: 3001,
            service_host: "127.0.0.1".to_string(),
        };

        let store = NoteStore::connect(&config).await.unwrap();
        assert!(matches!(store, NoteStore::Memory(_)));
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_spanner_without_settings_fails() {
        let config = Config {
            store_backend: StoreBackend::Spanner,
            spanner: None,
            service_port: 3001,
            service_host: "127.0.0.1".to_string(),
        };

        assert!(NoteStore::connect(&config).await.is_err());
    }
}
