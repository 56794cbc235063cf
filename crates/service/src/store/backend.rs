//! Open and shut down the configured store.

use std::{sync::Arc, time::Duration};

use configs::{StorageBackend, StorageConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{memory::MemoryStore, snapshot::SnapshotManager, sql::SqlStore, Store, StoreError};

enum Lifecycle {
    Sql(Arc<SqlStore>),
    Memory { flusher: JoinHandle<()>, shutdown: CancellationToken },
}

/// A ready store plus whatever must run when the process stops.
pub struct Backend {
    store: Arc<dyn Store>,
    lifecycle: Lifecycle,
}

impl Backend {
    /// Open the backend selected by `cfg.backend`. Any failure here is fatal to startup.
    pub async fn open(cfg: &StorageConfig) -> Result<Self, StoreError> {
        match cfg.backend {
            StorageBackend::Sqlite => {
                let sql = Arc::new(SqlStore::new(cfg.clone()));
                sql.open().await?;
                Ok(Self { store: sql.clone(), lifecycle: Lifecycle::Sql(sql) })
            }
            StorageBackend::Memory => {
                let memory = Arc::new(MemoryStore::new());
                let manager = Arc::new(SnapshotManager::new(
                    Arc::clone(&memory),
                    &cfg.snapshot_path,
                    Duration::from_secs(cfg.snapshot_interval_secs),
                ));
                manager.load().await?;
                let shutdown = CancellationToken::new();
                let flusher = manager.spawn(shutdown.clone());
                Ok(Self { store: memory, lifecycle: Lifecycle::Memory { flusher, shutdown } })
            }
        }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    /// Final snapshot flush (memory) or pool close (sqlite).
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!(backend = self.store.backend(), "store shutting down");
        match self.lifecycle {
            Lifecycle::Sql(sql) => sql.close().await,
            Lifecycle::Memory { flusher, shutdown } => {
                shutdown.cancel();
                if let Err(e) = flusher.await {
                    warn!(error = %e, "snapshot flusher task did not finish cleanly");
                }
                Ok(())
            }
        }
    }
}
