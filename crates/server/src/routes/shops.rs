use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::shop;
use serde::Serialize;
use service::shop_service::{self, CreateShopInput};
use tracing::info;

use crate::{errors::ApiError, extract::JsonOrForm, state::AppState};

#[derive(Debug, Serialize)]
pub struct ShopList {
    pub success: bool,
    pub count: usize,
    pub shops: Vec<shop::Model>,
}

#[derive(Debug, Serialize)]
pub struct ShopBody {
    pub success: bool,
    pub shop: shop::Model,
}

#[utoipa::path(
    get, path = "/api/shops", tag = "shops",
    responses(
        (status = 200, description = "All shops, newest first", body = crate::openapi::ShopListDoc),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<ShopList>, ApiError> {
    let shops = shop_service::list_shops(state.store.as_ref()).await?;
    Ok(Json(ShopList { success: true, count: shops.len(), shops }))
}

#[utoipa::path(
    get, path = "/api/shops/{subdomain}", tag = "shops",
    params(("subdomain" = String, Path, description = "Shop subdomain")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ShopBodyDoc),
        (status = 404, description = "Shop not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<ShopBody>, ApiError> {
    let shop = shop_service::get_shop_by_subdomain(state.store.as_ref(), &subdomain).await?;
    Ok(Json(ShopBody { success: true, shop }))
}

#[utoipa::path(
    post, path = "/api/shops", tag = "shops",
    request_body = crate::openapi::CreateShopDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ShopBodyDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Subdomain already taken", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: JsonOrForm<CreateShopInput, CreateShopInput>,
) -> Result<(StatusCode, Json<ShopBody>), ApiError> {
    let (JsonOrForm::Json(input) | JsonOrForm::Form(input)) = body;
    let shop = shop_service::create_shop(state.store.as_ref(), input).await?;
    info!(shop_id = shop.id, subdomain = %shop.subdomain, "created shop");
    Ok((StatusCode::CREATED, Json(ShopBody { success: true, shop })))
}
