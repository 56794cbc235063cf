use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use models::product;
use serde::{Deserialize, Serialize};
use service::product_service::{self, CreateProductForm, CreateProductInput};
use tracing::info;

use crate::{errors::ApiError, extract::JsonOrForm, state::AppState};

/// Raw query; `shop_id` is parsed by the service so a bad value gets a field message.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub shop_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub success: bool,
    pub count: usize,
    pub products: Vec<product::Model>,
}

#[derive(Debug, Serialize)]
pub struct ProductBody {
    pub success: bool,
    pub product: product::Model,
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    params(ListQuery),
    responses(
        (status = 200, description = "Products, newest first", body = crate::openapi::ProductListDoc),
        (status = 400, description = "Bad shop_id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Shop not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ProductList>, ApiError> {
    let Query(q) = query?;
    let shop_id = q.shop_id.as_deref().map(product_service::parse_shop_id).transpose()?;
    let products = product_service::list_products(state.store.as_ref(), shop_id).await?;
    Ok(Json(ProductList { success: true, count: products.len(), products }))
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    request_body = crate::openapi::CreateProductDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductBodyDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Shop not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: JsonOrForm<CreateProductInput, CreateProductForm>,
) -> Result<(StatusCode, Json<ProductBody>), ApiError> {
    let input = match body {
        JsonOrForm::Json(input) => input,
        JsonOrForm::Form(form) => CreateProductInput::try_from(form)?,
    };
    let product = product_service::create_product(state.store.as_ref(), input).await?;
    info!(product_id = product.id, shop_id = product.shop_id, "created product");
    Ok((StatusCode::CREATED, Json(ProductBody { success: true, product })))
}
