use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub success: bool, pub error: String }

#[derive(ToSchema)]
pub struct ShopDoc {
    pub id: i32,
    pub name: String,
    pub subdomain: String,
    pub owner_email: String,
    /// RFC 3339
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct ShopListDoc { pub success: bool, pub count: usize, pub shops: Vec<ShopDoc> }

#[derive(ToSchema)]
pub struct ShopBodyDoc { pub success: bool, pub shop: ShopDoc }

#[derive(ToSchema)]
pub struct CreateShopDoc { pub name: String, pub subdomain: String, pub owner_email: String }

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: i32,
    pub shop_id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct ProductListDoc { pub success: bool, pub count: usize, pub products: Vec<ProductDoc> }

#[derive(ToSchema)]
pub struct ProductBodyDoc { pub success: bool, pub product: ProductDoc }

#[derive(ToSchema)]
pub struct CreateProductDoc {
    pub shop_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: Option<i64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::shops::list,
        crate::routes::shops::get_by_subdomain,
        crate::routes::shops::create,
        crate::routes::products::list,
        crate::routes::products::create,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            ShopDoc,
            ShopListDoc,
            ShopBodyDoc,
            CreateShopDoc,
            ProductDoc,
            ProductListDoc,
            ProductBodyDoc,
            CreateProductDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "shops"),
        (name = "products")
    )
)]
pub struct ApiDoc;
