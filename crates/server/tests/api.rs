use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::{routes, startup::build_cors, state::AppState};
use service::store::{memory::{MemoryStore, Tables}, sql::SqlStore, Store};

struct TestApp {
    router: Router,
    sql: Option<(Arc<SqlStore>, PathBuf)>,
}

impl TestApp {
    async fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.load(Tables::default()).await;
        Self::with_store(store, None)
    }

    async fn sqlite() -> anyhow::Result<Self> {
        let path = std::env::temp_dir().join(format!("storefront_api_{}.db", Uuid::new_v4()));
        let cfg = configs::StorageConfig {
            database_url: format!("sqlite://{}?mode=rwc", path.display()),
            ..configs::StorageConfig::default()
        };
        let store = Arc::new(SqlStore::new(cfg));
        store.open().await?;
        Ok(Self::with_store(store.clone(), Some((store, path))))
    }

    fn with_store(store: Arc<dyn Store>, sql: Option<(Arc<SqlStore>, PathBuf)>) -> Self {
        Self { router: routes::build_router(AppState::new(store), build_cors()), sql }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v)?)
            }
            None => Body::empty(),
        };
        let res = self.router.clone().oneshot(req.body(body)?).await?;
        let status = res.status();
        let bytes = res.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        Ok((status, value))
    }

    async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::POST, uri, Some(body)).await
    }

    async fn post_form(&self, uri: &str, form: &str) -> anyhow::Result<(StatusCode, Value)> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))?;
        let res = self.router.clone().oneshot(req).await?;
        let status = res.status();
        let bytes = res.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
    }

    async fn cleanup(self) -> anyhow::Result<()> {
        if let Some((store, path)) = self.sql {
            store.close().await?;
            let _ = std::fs::remove_file(path);
        }
        Ok(())
    }
}

fn shop_body(subdomain: &str) -> Value {
    json!({"name": "My Shop", "subdomain": subdomain, "owner_email": format!("owner@{subdomain}.io")})
}

async fn create_shop(app: &TestApp, subdomain: &str) -> anyhow::Result<i64> {
    let (status, body) = app.post("/api/shops", shop_body(subdomain)).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["shop"]["id"].as_i64().ok_or_else(|| anyhow::anyhow!("no shop id in {body}"))
}

async fn shop_then_products_scenario(app: &TestApp) -> anyhow::Result<()> {
    let (status, body) = app.post("/api/shops", shop_body("myshop")).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["shop"]["subdomain"], "myshop");
    let shop_id = body["shop"]["id"].as_i64().unwrap_or_default();
    assert!(shop_id >= 1);

    let (status, body) = app
        .post("/api/products", json!({"shop_id": shop_id, "name": "Mug", "price": 12.5}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["description"], "");
    assert_eq!(body["product"]["stock"], 0);
    assert_eq!(body["product"]["price"], 12.5);

    let (status, body) = app
        .post("/api/products", json!({"shop_id": shop_id, "name": "Cap", "description": "red", "price": 8, "stock": 4}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let cap_id = body["product"]["id"].clone();

    let (status, body) = app.get(&format!("/api/products?shop_id={shop_id}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["products"][0]["id"], cap_id);

    let (status, body) = app.get("/api/shops/myshop").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shop"]["id"], shop_id);
    assert_eq!(body["shop"]["owner_email"], "owner@myshop.io");
    Ok(())
}

async fn duplicate_subdomain_conflicts(app: &TestApp) -> anyhow::Result<()> {
    create_shop(app, "taken").await?;
    let (status, body) = app.post("/api/shops", shop_body("taken")).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"success": false, "error": "Subdomain already taken"}));

    let (_, body) = app.get("/api/shops").await?;
    assert_eq!(body["count"], 1);
    Ok(())
}

async fn invalid_shop_fields_are_rejected(app: &TestApp) -> anyhow::Result<()> {
    for body in [
        json!({"name": "X", "subdomain": "Bad_Sub", "owner_email": "a@b.com"}),
        json!({"name": "X", "subdomain": "ok", "owner_email": "nope"}),
        json!({"name": "   ", "subdomain": "ok", "owner_email": "a@b.com"}),
        json!({"subdomain": "ok", "owner_email": "a@b.com"}),
    ] {
        let (status, res) = app.post("/api/shops", body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{res}");
        assert_eq!(res["success"], false);
        assert!(res["error"].as_str().is_some());
    }
    let (_, body) = app.get("/api/shops").await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

async fn product_for_unknown_shop_is_not_found(app: &TestApp) -> anyhow::Result<()> {
    let (status, body) = app
        .post("/api/products", json!({"shop_id": 999, "name": "Ghost", "price": 1}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Shop not found");

    let (_, body) = app.get("/api/products").await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

async fn negative_price_or_stock_is_rejected(app: &TestApp) -> anyhow::Result<()> {
    let shop_id = create_shop(app, "neg").await?;
    let (status, body) = app
        .post("/api/products", json!({"shop_id": shop_id, "name": "A", "price": -1}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price must be a non-negative number");

    let (status, _) = app
        .post("/api/products", json!({"shop_id": shop_id, "name": "A", "price": 1, "stock": -2}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/products").await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

async fn product_listing_filters(app: &TestApp) -> anyhow::Result<()> {
    let a = create_shop(app, "a").await?;
    let b = create_shop(app, "b").await?;
    for (shop_id, name) in [(a, "a1"), (b, "b1"), (a, "a2")] {
        let (status, _) = app
            .post("/api/products", json!({"shop_id": shop_id, "name": name, "price": 1}))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get(&format!("/api/products?shop_id={a}")).await?;
    let names: Vec<&str> = body["products"]
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["a2", "a1"]);

    let (_, body) = app.get("/api/products").await?;
    assert_eq!(body["count"], 3);

    let (status, body) = app.get("/api/products?shop_id=abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "shop_id must be a positive integer");

    let (status, _) = app.get("/api/products?shop_id=12345").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

async fn shops_list_newest_first(app: &TestApp) -> anyhow::Result<()> {
    let first = create_shop(app, "first").await?;
    let second = create_shop(app, "second").await?;
    let (status, body) = app.get("/api/shops").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["shops"][0]["id"], second);
    assert_eq!(body["shops"][1]["id"], first);
    Ok(())
}

async fn malformed_bodies_are_bad_requests(app: &TestApp) -> anyhow::Result<()> {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/shops")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))?;
    let res = app.router.clone().oneshot(req).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/products", json!({"shop_id": "one", "name": "x", "price": 1})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

async fn shop_created_from_form(app: &TestApp) -> anyhow::Result<()> {
    let (status, body) = app
        .post_form("/api/shops", "name=My+Shop&subdomain=formshop&owner_email=owner%40formshop.io")
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["shop"]["name"], "My Shop");
    assert_eq!(body["shop"]["owner_email"], "owner@formshop.io");

    let (status, body) = app.post_form("/api/shops", "name=Dup&subdomain=formshop&owner_email=a%40b.com").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Subdomain already taken");

    let (status, body) = app.post_form("/api/shops", "subdomain=other&owner_email=a%40b.com").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");
    Ok(())
}

async fn product_created_from_form(app: &TestApp) -> anyhow::Result<()> {
    let shop_id = create_shop(app, "formprod").await?;
    let (status, body) = app
        .post_form("/api/products", &format!("shop_id={shop_id}&name=Mug&description=tall&price=12.5&stock=3"))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["product"]["shop_id"], shop_id);
    assert_eq!(body["product"]["price"], 12.5);
    assert_eq!(body["product"]["stock"], 3);

    let (status, body) = app
        .post_form("/api/products", &format!("shop_id={shop_id}&name=Mug&price=abc"))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price must be a non-negative number");

    let (status, body) = app.post_form("/api/products", &format!("shop_id={shop_id}&name=Mug&price=-1")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price must be a non-negative number");

    let (status, body) = app.post_form("/api/products", "shop_id=x&name=Mug&price=1").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "shop_id must be a positive integer");

    let (status, _) = app.post_form("/api/products", "shop_id=999&name=Ghost&price=1").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&format!("/api/products?shop_id={shop_id}")).await?;
    assert_eq!(body["count"], 1);
    Ok(())
}

macro_rules! against_both_backends {
    ($($name:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() -> anyhow::Result<()> {
                    let app = super::TestApp::memory().await;
                    super::$name(&app).await
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() -> anyhow::Result<()> {
                    let app = super::TestApp::sqlite().await?;
                    let result = super::$name(&app).await;
                    app.cleanup().await?;
                    result
                }
            )*
        }
    };
}

against_both_backends!(
    shop_then_products_scenario,
    duplicate_subdomain_conflicts,
    invalid_shop_fields_are_rejected,
    product_for_unknown_shop_is_not_found,
    negative_price_or_stock_is_rejected,
    product_listing_filters,
    shops_list_newest_first,
    malformed_bodies_are_bad_requests,
    shop_created_from_form,
    product_created_from_form,
);

#[tokio::test]
async fn health_root_and_fallback() -> anyhow::Result<()> {
    let app = TestApp::memory().await;
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let res = app.router.clone().oneshot(Request::builder().uri("/").body(Body::empty())?).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.into_body().collect().await?.to_bytes();
    assert_eq!(&text[..], routes::BANNER.as_bytes());

    let (status, body) = app.get("/no/such/route").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Endpoint not found"}));
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_routes() -> anyhow::Result<()> {
    let app = TestApp::memory().await;
    let (status, body) = app.get("/api-docs/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/shops"].is_object());
    assert!(body["paths"]["/api/products"].is_object());
    Ok(())
}

#[tokio::test]
async fn store_failure_is_internal_error() -> anyhow::Result<()> {
    // never loaded, so every statement fails with NotInitialized
    let app = TestApp::with_store(Arc::new(MemoryStore::new()), None);
    let (status, body) = app.get("/api/shops").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Internal server error"}));
    Ok(())
}
