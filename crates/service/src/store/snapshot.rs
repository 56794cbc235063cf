//! JSON snapshots for [`MemoryStore`].
//!
//! The manager loads the snapshot file on startup and rewrites it from a single
//! background task: on a fixed interval, after every successful write, and once
//! more on shutdown. Durability is deliberately weak; anything written after the
//! last successful flush is lost if the process dies uncleanly.

use std::{io::ErrorKind, path::PathBuf, sync::Arc, time::Duration};

use tokio::{fs, task::JoinHandle, time::{interval_at, Instant, MissedTickBehavior}};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::memory::{MemoryStore, Tables};
use super::StoreError;

pub struct SnapshotManager {
    store: Arc<MemoryStore>,
    path: PathBuf,
    interval: Duration,
}

impl SnapshotManager {
    pub fn new<P: Into<PathBuf>>(store: Arc<MemoryStore>, path: P, interval: Duration) -> Self {
        // tokio intervals reject a zero period
        Self { store, path: path.into(), interval: interval.max(Duration::from_millis(10)) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Initialize the store from the snapshot file, or start empty and write one.
    ///
    /// An unreadable or corrupt file is an error rather than a silent reset.
    pub async fn load(&self) -> Result<(), StoreError> {
        common::env::ensure_parent_dir(&self.path)
            .await
            .map_err(|e| StoreError::Engine(e.to_string()))?;

        match fs::read(&self.path).await {
            Ok(bytes) => {
                let tables: Tables = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Engine(format!("corrupt snapshot {}: {e}", self.path.display()))
                })?;
                info!(
                    path = %self.path.display(),
                    shops = tables.shops.len(),
                    products = tables.products.len(),
                    "snapshot loaded"
                );
                self.store.load(tables).await;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no snapshot found; starting empty");
                self.store.load(Tables::default()).await;
                self.flush().await
            }
            Err(e) => Err(StoreError::Engine(format!("cannot read {}: {e}", self.path.display()))),
        }
    }

    /// Write the current state. A temp file plus rename keeps the old snapshot
    /// intact if the write fails halfway.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let tables = self.store.snapshot().await?;
        let data = serde_json::to_vec_pretty(&tables).map_err(|e| StoreError::Engine(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data)
            .await
            .map_err(|e| StoreError::Engine(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Engine(format!("cannot replace {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), shops = tables.shops.len(), products = tables.products.len(), "snapshot flushed");
        Ok(())
    }

    async fn flush_logged(&self, trigger: &'static str) {
        if let Err(e) = self.flush().await {
            error!(path = %self.path.display(), trigger, error = %e, "snapshot flush failed; on-disk copy is stale");
        }
    }

    /// Run the flusher until `shutdown` is cancelled, then flush one last time.
    ///
    /// The write receiver is taken before the task starts, so writes issued
    /// between `spawn` returning and the task's first poll still trigger a flush.
    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let mut writes = self.store.subscribe();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(path = %self.path.display(), interval_secs = self.interval.as_secs_f64(), "snapshot flusher started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    changed = writes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        self.flush_logged("write").await;
                    }
                    _ = ticker.tick() => self.flush_logged("interval").await,
                }
            }

            self.flush_logged("shutdown").await;
            info!(path = %self.path.display(), "snapshot flusher stopped");
        })
    }
}
