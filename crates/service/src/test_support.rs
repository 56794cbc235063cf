#![cfg(test)]
use std::path::PathBuf;

use configs::StorageConfig;
use uuid::Uuid;

use crate::store::memory::{MemoryStore, Tables};
use crate::store::sql::SqlStore;

/// Opened SQLite store on a fresh temp file. Callers remove the file.
pub async fn sql_store() -> Result<(SqlStore, PathBuf), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("storefront_test_{}.db", Uuid::new_v4()));
    let cfg = StorageConfig {
        database_url: format!("sqlite://{}?mode=rwc", path.display()),
        ..StorageConfig::default()
    };
    let store = SqlStore::new(cfg);
    store.open().await?;
    Ok((store, path))
}

/// Empty, loaded memory store with no snapshot attached.
pub async fn memory_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.load(Tables::default()).await;
    store
}
