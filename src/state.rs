use crate::store::NoteStore;

/// Shared application state
///
/// Handlers keep nothing between requests; the store handle is the only
/// process-wide resource.
#[derive(Clone)]
pub struct AppState {
    pub store: NoteStore,
}

impl AppState {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }
}
