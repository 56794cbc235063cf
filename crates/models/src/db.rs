use std::time::Duration;

use configs::StorageConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Open a SQLite pool from storage config.
///
/// sqlx enables `foreign_keys` on every pooled SQLite connection by default, which the
/// product -> shop cascade relies on. WAL is persisted in the database file, so one
/// pragma on any connection covers the pool.
pub async fn connect_with_config(cfg: &StorageConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(cfg.database_url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    db.execute_unprepared("PRAGMA journal_mode = WAL").await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    info!(url = %cfg.database_url, "sqlite database connected");
    Ok(db)
}

/// Connect with default pool settings.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let cfg = StorageConfig { database_url: url.to_string(), ..StorageConfig::default() };
    connect_with_config(&cfg).await
}
