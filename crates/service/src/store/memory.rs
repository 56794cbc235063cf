use std::cmp::Reverse;

use async_trait::async_trait;
use models::{product, shop};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::{now, Order, Outcome, Record, Statement, Store, StoreError};

/// Full state of the in-memory engine; also the snapshot file format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub shops: Vec<shop::Model>,
    #[serde(default)]
    pub products: Vec<product::Model>,
    /// Last id handed out for `shops`; ids are never reused.
    #[serde(default)]
    pub shop_seq: i32,
    #[serde(default)]
    pub product_seq: i32,
}

impl Tables {
    /// Repair sequences that lag behind the stored rows (hand-edited snapshots).
    fn normalize(mut self) -> Self {
        let max_shop = self.shops.iter().map(|s| s.id).max().unwrap_or(0);
        let max_product = self.products.iter().map(|p| p.id).max().unwrap_or(0);
        self.shop_seq = self.shop_seq.max(max_shop);
        self.product_seq = self.product_seq.max(max_product);
        self.shops.sort_by_key(|s| s.id);
        self.products.sort_by_key(|p| p.id);
        self
    }
}

/// In-memory store. Holds no state until [`MemoryStore::load`] is called.
///
/// Every statement runs inside a single lock section, so a [`MemoryStore::snapshot`]
/// always observes a state between two statements. Successful writes bump a
/// generation counter that flushers can watch via [`MemoryStore::subscribe`].
pub struct MemoryStore {
    tables: RwLock<Option<Tables>>,
    writes: watch::Sender<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (writes, _) = watch::channel(0);
        Self { tables: RwLock::new(None), writes }
    }

    /// Install the initial state, replacing anything already loaded.
    pub async fn load(&self, tables: Tables) {
        *self.tables.write().await = Some(tables.normalize());
    }

    pub async fn is_loaded(&self) -> bool {
        self.tables.read().await.is_some()
    }

    /// Point-in-time copy of the whole state.
    pub async fn snapshot(&self) -> Result<Tables, StoreError> {
        self.tables.read().await.clone().ok_or(StoreError::NotInitialized)
    }

    /// Receiver that changes after every successful write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.writes.subscribe()
    }

    fn read(tables: &Tables, statement: Statement) -> Result<Outcome, StoreError> {
        let rows = match statement {
            Statement::ListShops { order } => {
                let mut shops: Vec<_> = tables.shops.clone();
                if order == Order::NewestFirst {
                    shops.sort_by_key(|s| Reverse((s.created_at, s.id)));
                }
                shops.into_iter().map(Record::Shop).collect()
            }
            Statement::FindShopById { id } => tables
                .shops
                .iter()
                .filter(|s| s.id == id)
                .cloned()
                .map(Record::Shop)
                .collect(),
            Statement::FindShopBySubdomain { subdomain } => tables
                .shops
                .iter()
                .filter(|s| s.subdomain == subdomain)
                .cloned()
                .map(Record::Shop)
                .collect(),
            Statement::ListProducts { shop_id, order } => {
                let mut products: Vec<_> = tables
                    .products
                    .iter()
                    .filter(|p| shop_id.map_or(true, |id| p.shop_id == id))
                    .cloned()
                    .collect();
                if order == Order::NewestFirst {
                    products.sort_by_key(|p| Reverse((p.created_at, p.id)));
                }
                products.into_iter().map(Record::Product).collect()
            }
            Statement::FindProductById { id } => tables
                .products
                .iter()
                .filter(|p| p.id == id)
                .cloned()
                .map(Record::Product)
                .collect(),
            write @ (Statement::InsertShop(_) | Statement::DeleteShop { .. } | Statement::InsertProduct(_)) => {
                return Err(StoreError::Engine(format!("{} is not a read statement", write.kind())));
            }
        };
        Ok(Outcome::Rows(rows))
    }

    fn write(tables: &mut Tables, statement: Statement) -> Result<Outcome, StoreError> {
        match statement {
            Statement::InsertShop(new_shop) => {
                if tables.shops.iter().any(|s| s.subdomain == new_shop.subdomain) {
                    return Err(StoreError::ConstraintViolation(
                        "UNIQUE constraint failed: shops.subdomain".into(),
                    ));
                }
                let id = next_id(&mut tables.shop_seq)?;
                tables.shops.push(new_shop.into_model(id, now()));
                Ok(Outcome::Written { inserted_id: Some(id), changes: 1 })
            }
            Statement::DeleteShop { id } => {
                let before = tables.shops.len();
                tables.shops.retain(|s| s.id != id);
                let changes = (before - tables.shops.len()) as u64;
                if changes > 0 {
                    tables.products.retain(|p| p.shop_id != id);
                }
                Ok(Outcome::Written { inserted_id: None, changes })
            }
            Statement::InsertProduct(new_product) => {
                if !tables.shops.iter().any(|s| s.id == new_product.shop_id) {
                    return Err(StoreError::ConstraintViolation("FOREIGN KEY constraint failed".into()));
                }
                let id = next_id(&mut tables.product_seq)?;
                tables.products.push(new_product.into_model(id, now()));
                Ok(Outcome::Written { inserted_id: Some(id), changes: 1 })
            }
            other => Self::read(tables, other),
        }
    }
}

fn next_id(seq: &mut i32) -> Result<i32, StoreError> {
    *seq = seq.checked_add(1).ok_or_else(|| StoreError::Engine("id sequence exhausted".into()))?;
    Ok(*seq)
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn execute(&self, statement: Statement) -> Result<Outcome, StoreError> {
        debug!(statement = statement.kind(), "memory execute");
        if !statement.is_write() {
            let guard = self.tables.read().await;
            let tables = guard.as_ref().ok_or(StoreError::NotInitialized)?;
            return Self::read(tables, statement);
        }

        let outcome = {
            let mut guard = self.tables.write().await;
            let tables = guard.as_mut().ok_or(StoreError::NotInitialized)?;
            Self::write(tables, statement)?
        };
        if outcome.changes() > 0 {
            self.writes.send_modify(|generation| *generation += 1);
        }
        Ok(outcome)
    }
}
