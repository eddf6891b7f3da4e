//! Shared application state for the gateway

use std::sync::Arc;

use roster_database::{SqlitePool, UserRepository, UserStore};

/// Handles the request handlers share; built once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// State backed by the SQLite user repository
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(UserRepository::new(pool)))
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }
}
