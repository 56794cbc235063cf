use std::path::PathBuf;

use async_trait::async_trait;
use configs::StorageConfig;
use migration::MigratorTrait;
use models::{product, shop};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Select, SqlErr,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{now, Order, Outcome, Record, Statement, Store, StoreError};

/// SQLite-backed store.
///
/// Constructed closed; [`SqlStore::open`] connects and applies the schema, and
/// [`SqlStore::close`] releases the pool. Statements issued while closed fail
/// with [`StoreError::NotInitialized`].
pub struct SqlStore {
    cfg: StorageConfig,
    db: RwLock<Option<DatabaseConnection>>,
}

impl SqlStore {
    pub fn new(cfg: StorageConfig) -> Self {
        Self { cfg, db: RwLock::new(None) }
    }

    /// Connect and run the (idempotent) schema migrations.
    pub async fn open(&self) -> Result<(), StoreError> {
        if let Some(path) = sqlite_file_path(&self.cfg.database_url) {
            common::env::ensure_parent_dir(&path)
                .await
                .map_err(|e| StoreError::Engine(e.to_string()))?;
        }
        let db = models::db::connect_with_config(&self.cfg).await.map_err(map_db_err)?;
        migration::Migrator::up(&db, None).await.map_err(map_db_err)?;
        info!(url = %self.cfg.database_url, "schema ready");
        *self.db.write().await = Some(db);
        Ok(())
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        if let Some(db) = self.db.write().await.take() {
            db.close().await.map_err(map_db_err)?;
            info!("sqlite pool closed");
        }
        Ok(())
    }

    async fn conn(&self) -> Result<DatabaseConnection, StoreError> {
        self.db.read().await.clone().ok_or(StoreError::NotInitialized)
    }
}

#[async_trait]
impl Store for SqlStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn execute(&self, statement: Statement) -> Result<Outcome, StoreError> {
        let db = self.conn().await?;
        debug!(statement = statement.kind(), "sql execute");
        let outcome = match statement {
            Statement::ListShops { order } => {
                let rows = order_shops(shop::Entity::find(), order).all(&db).await.map_err(map_db_err)?;
                Outcome::Rows(rows.into_iter().map(Record::Shop).collect())
            }
            Statement::FindShopById { id } => {
                let row = shop::Entity::find_by_id(id).one(&db).await.map_err(map_db_err)?;
                Outcome::Rows(row.into_iter().map(Record::Shop).collect())
            }
            Statement::FindShopBySubdomain { subdomain } => {
                let row = shop::Entity::find()
                    .filter(shop::Column::Subdomain.eq(subdomain))
                    .one(&db)
                    .await
                    .map_err(map_db_err)?;
                Outcome::Rows(row.into_iter().map(Record::Shop).collect())
            }
            Statement::InsertShop(new_shop) => {
                let res = shop::Entity::insert(new_shop.into_active_model(now()))
                    .exec(&db)
                    .await
                    .map_err(map_db_err)?;
                Outcome::Written { inserted_id: Some(res.last_insert_id), changes: 1 }
            }
            Statement::DeleteShop { id } => {
                // products go with it through ON DELETE CASCADE
                let res = shop::Entity::delete_by_id(id).exec(&db).await.map_err(map_db_err)?;
                Outcome::Written { inserted_id: None, changes: res.rows_affected }
            }
            Statement::ListProducts { shop_id, order } => {
                let mut query = product::Entity::find();
                if let Some(shop_id) = shop_id {
                    query = query.filter(product::Column::ShopId.eq(shop_id));
                }
                let rows = order_products(query, order).all(&db).await.map_err(map_db_err)?;
                Outcome::Rows(rows.into_iter().map(Record::Product).collect())
            }
            Statement::FindProductById { id } => {
                let row = product::Entity::find_by_id(id).one(&db).await.map_err(map_db_err)?;
                Outcome::Rows(row.into_iter().map(Record::Product).collect())
            }
            Statement::InsertProduct(new_product) => {
                let res = product::Entity::insert(new_product.into_active_model(now()))
                    .exec(&db)
                    .await
                    .map_err(map_db_err)?;
                Outcome::Written { inserted_id: Some(res.last_insert_id), changes: 1 }
            }
        };
        Ok(outcome)
    }
}

fn order_shops(query: Select<shop::Entity>, order: Order) -> Select<shop::Entity> {
    match order {
        Order::Insertion => query.order_by_asc(shop::Column::Id),
        Order::NewestFirst => query
            .order_by_desc(shop::Column::CreatedAt)
            .order_by_desc(shop::Column::Id),
    }
}

fn order_products(query: Select<product::Entity>, order: Order) -> Select<product::Entity> {
    match order {
        Order::Insertion => query.order_by_asc(product::Column::Id),
        Order::NewestFirst => query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id),
    }
}

fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::ConstraintViolation(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => StoreError::ConstraintViolation(msg),
        _ => StoreError::Engine(err.to_string()),
    }
}

/// On-disk file behind a `sqlite:` URL, if any.
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
