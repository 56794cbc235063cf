//! Store contract shared by the storage backends.
//!
//! A store executes one of a fixed set of parameterized [`Statement`]s against the
//! `shops` and `products` collections. Reads return rows, writes return the number
//! of affected rows plus the generated id for inserts.
//!
//! - [`sql::SqlStore`]: SQLite through sea-orm
//! - [`memory::MemoryStore`]: in-memory tables, persisted by [`snapshot::SnapshotManager`]

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use models::{product, shop};
use sea_orm::prelude::DateTimeUtc;
use thiserror::Error;

pub mod backend;
pub mod memory;
pub mod snapshot;
pub mod sql;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness or referential-integrity rule rejected a write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("store used before it was opened")]
    NotInitialized,
    #[error("storage engine error: {0}")]
    Engine(String),
}

/// Row ordering for list statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending id, i.e. insertion order.
    #[default]
    Insertion,
    /// Descending `created_at`, ties broken by descending id.
    NewestFirst,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ListShops { order: Order },
    FindShopById { id: i32 },
    FindShopBySubdomain { subdomain: String },
    InsertShop(shop::NewShop),
    /// Removes the shop and, transitively, its products.
    DeleteShop { id: i32 },
    ListProducts { shop_id: Option<i32>, order: Order },
    FindProductById { id: i32 },
    InsertProduct(product::NewProduct),
}

impl Statement {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::InsertShop(_) | Self::DeleteShop { .. } | Self::InsertProduct(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListShops { .. } => "list_shops",
            Self::FindShopById { .. } => "find_shop_by_id",
            Self::FindShopBySubdomain { .. } => "find_shop_by_subdomain",
            Self::InsertShop(_) => "insert_shop",
            Self::DeleteShop { .. } => "delete_shop",
            Self::ListProducts { .. } => "list_products",
            Self::FindProductById { .. } => "find_product_by_id",
            Self::InsertProduct(_) => "insert_product",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Shop(shop::Model),
    Product(product::Model),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Record>),
    Written { inserted_id: Option<i32>, changes: u64 },
}

impl Outcome {
    pub fn inserted_id(&self) -> Option<i32> {
        match self {
            Self::Written { inserted_id, .. } => *inserted_id,
            Self::Rows(_) => None,
        }
    }

    pub fn changes(&self) -> u64 {
        match self {
            Self::Written { changes, .. } => *changes,
            Self::Rows(_) => 0,
        }
    }

    pub fn into_shops(self) -> Result<Vec<shop::Model>, StoreError> {
        self.into_rows()?
            .into_iter()
            .map(|r| match r {
                Record::Shop(s) => Ok(s),
                Record::Product(_) => Err(StoreError::Engine("expected shop rows".into())),
            })
            .collect()
    }

    pub fn into_products(self) -> Result<Vec<product::Model>, StoreError> {
        self.into_rows()?
            .into_iter()
            .map(|r| match r {
                Record::Product(p) => Ok(p),
                Record::Shop(_) => Err(StoreError::Engine("expected product rows".into())),
            })
            .collect()
    }

    fn into_rows(self) -> Result<Vec<Record>, StoreError> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Written { .. } => Err(StoreError::Engine("expected rows from a read statement".into())),
        }
    }
}

/// Parameterized statement execution over the two collections.
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logs.
    fn backend(&self) -> &'static str;

    async fn execute(&self, statement: Statement) -> Result<Outcome, StoreError>;
}

/// Row counts `(shops, products)`, logged at startup.
pub async fn stats(store: &dyn Store) -> Result<(usize, usize), StoreError> {
    let shops = store.execute(Statement::ListShops { order: Order::Insertion }).await?.into_shops()?;
    let products = store
        .execute(Statement::ListProducts { shop_id: None, order: Order::Insertion })
        .await?
        .into_products()?;
    Ok((shops.len(), products.len()))
}

/// Creation timestamp at second resolution, matching SQLite's `CURRENT_TIMESTAMP`.
/// Whole seconds also keep the text encoding sortable.
pub(crate) fn now() -> DateTimeUtc {
    Utc::now().trunc_subsecs(0)
}
