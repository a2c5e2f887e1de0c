use std::sync::Arc;

use crate::{
    auth::{AuthProvider, StaticTokenAuth},
    db::{InMemoryStore, TrackerStore},
};

/// Shared application state
///
/// Holds no per-user data: every request resolves its own `UserContext`
/// and reads fresh from the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackerStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackerStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    /// In-memory store with a fixed token table
    pub fn in_memory(auth: StaticTokenAuth) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(auth))
    }
}
