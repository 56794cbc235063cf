use std::sync::Arc;

use service::store::Store;

/// Shared handler state. The store is constructed by startup and injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
