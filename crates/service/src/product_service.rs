use models::product;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::store::{Order, Statement, Store, StoreError};

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductInput {
    #[serde(default)]
    pub shop_id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// Parse the raw `shop_id` query value.
/// Form-encoded body of `POST /api/products`. Every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductForm {
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub stock: Option<String>,
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}

impl TryFrom<CreateProductForm> for CreateProductInput {
    type Error = ServiceError;

    /// Parse the numeric fields. Blank values count as absent, so they get the
    /// same "is required" or default handling as a missing JSON field.
    fn try_from(form: CreateProductForm) -> Result<Self, Self::Error> {
        let shop_id = non_empty(form.shop_id).map(|raw| parse_shop_id(&raw)).transpose()?;
        let price = non_empty(form.price)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ServiceError::Validation("price must be a non-negative number".into()))
            })
            .transpose()?;
        let stock = non_empty(form.stock)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ServiceError::Validation("stock must be a non-negative integer".into()))
            })
            .transpose()?;
        Ok(Self { shop_id, name: form.name, description: form.description, price, stock })
    }
}

pub fn parse_shop_id(raw: &str) -> Result<i32, ServiceError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ServiceError::Validation("shop_id must be a positive integer".into())),
    }
}

/// Products newest first, optionally limited to one shop. Filtering by a shop
/// that does not exist is a not-found error rather than an empty list.
pub async fn list_products(store: &dyn Store, shop_id: Option<i32>) -> Result<Vec<product::Model>, ServiceError> {
    if let Some(id) = shop_id {
        crate::shop_service::get_shop(store, id).await?;
    }
    Ok(store
        .execute(Statement::ListProducts { shop_id, order: Order::NewestFirst })
        .await?
        .into_products()?)
}

pub async fn get_product(store: &dyn Store, id: i32) -> Result<product::Model, ServiceError> {
    store
        .execute(Statement::FindProductById { id })
        .await?
        .into_products()?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::not_found("Product"))
}

#[instrument(skip(store, input), fields(shop_id = input.shop_id))]
pub async fn create_product(store: &dyn Store, input: CreateProductInput) -> Result<product::Model, ServiceError> {
    let shop_id = input.shop_id.ok_or_else(|| ServiceError::Validation("shop_id is required".into()))?;
    let price = input.price.ok_or_else(|| ServiceError::Validation("price is required".into()))?;
    let new_product = product::NewProduct::new(
        shop_id,
        input.name.as_deref().unwrap_or_default(),
        input.description.as_deref(),
        price,
        input.stock,
    )?;

    crate::shop_service::get_shop(store, shop_id).await?;

    let id = match store.execute(Statement::InsertProduct(new_product)).await {
        Ok(outcome) => outcome
            .inserted_id()
            .ok_or_else(|| StoreError::Engine("insert returned no id".into()))?,
        // shop deleted between the lookup and the insert
        Err(StoreError::ConstraintViolation(_)) => return Err(ServiceError::not_found("Shop")),
        Err(e) => return Err(e.into()),
    };
    let created = get_product(store, id).await?;
    info!(product_id = created.id, shop_id = created.shop_id, "product_created");
    Ok(created)
}
