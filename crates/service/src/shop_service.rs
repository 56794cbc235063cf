use models::shop;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::store::{Order, Statement, Store, StoreError};

pub const SUBDOMAIN_TAKEN: &str = "Subdomain already taken";

/// Body of `POST /api/shops`. Fields are optional here so that a missing one
/// surfaces as a field-level validation message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateShopInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
}

/// All shops, newest first.
pub async fn list_shops(store: &dyn Store) -> Result<Vec<shop::Model>, ServiceError> {
    Ok(store.execute(Statement::ListShops { order: Order::NewestFirst }).await?.into_shops()?)
}

pub async fn get_shop(store: &dyn Store, id: i32) -> Result<shop::Model, ServiceError> {
    store
        .execute(Statement::FindShopById { id })
        .await?
        .into_shops()?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("Shop"))
}

pub async fn get_shop_by_subdomain(store: &dyn Store, subdomain: &str) -> Result<shop::Model, ServiceError> {
    store
        .execute(Statement::FindShopBySubdomain { subdomain: subdomain.to_string() })
        .await?
        .into_shops()?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("Shop"))
}

/// Validate and insert a shop.
///
/// Field validation runs first, then the subdomain lookup. A concurrent insert
/// that wins the race is still caught by the store's uniqueness rule.
///
/// # Examples
/// ```
/// use service::shop_service::{create_shop, CreateShopInput};
/// use service::store::memory::{MemoryStore, Tables};
/// let store = MemoryStore::new();
/// tokio_test::block_on(store.load(Tables::default()));
/// let input = CreateShopInput {
///     name: Some("Acme".into()),
///     subdomain: Some("acme".into()),
///     owner_email: Some("owner@acme.io".into()),
/// };
/// let shop = tokio_test::block_on(create_shop(&store, input)).unwrap();
/// assert_eq!(shop.id, 1);
/// assert_eq!(shop.subdomain, "acme");
/// ```
#[instrument(skip(store, input), fields(subdomain = input.subdomain.as_deref().unwrap_or_default()))]
pub async fn create_shop(store: &dyn Store, input: CreateShopInput) -> Result<shop::Model, ServiceError> {
    let new_shop = shop::NewShop::new(
        input.name.as_deref().unwrap_or_default(),
        input.subdomain.as_deref().unwrap_or_default(),
        input.owner_email.as_deref().unwrap_or_default(),
    )?;

    let taken = store
        .execute(Statement::FindShopBySubdomain { subdomain: new_shop.subdomain.clone() })
        .await?
        .into_shops()?;
    if !taken.is_empty() {
        return Err(ServiceError::Conflict(SUBDOMAIN_TAKEN.into()));
    }

    let id = match store.execute(Statement::InsertShop(new_shop)).await {
        Ok(outcome) => outcome
            .inserted_id()
            .ok_or_else(|| StoreError::Engine("insert returned no id".into()))?,
        Err(StoreError::ConstraintViolation(_)) => return Err(ServiceError::Conflict(SUBDOMAIN_TAKEN.into())),
        Err(e) => return Err(e.into()),
    };
    let created = get_shop(store, id).await?;
    info!(shop_id = created.id, subdomain = %created.subdomain, "shop_created");
    Ok(created)
}
