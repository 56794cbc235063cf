//! Behaviour both store backends must agree on.

use models::{product, shop};

use crate::store::{Order, Statement, Store, StoreError};
use crate::test_support::{memory_store, sql_store};

fn new_shop(subdomain: &str) -> shop::NewShop {
    shop::NewShop::new(&subdomain.to_uppercase(), subdomain, &format!("owner@{subdomain}.io")).unwrap()
}

fn new_product(shop_id: i32, name: &str) -> product::NewProduct {
    product::NewProduct::new(shop_id, name, None, 1.5, Some(2)).unwrap()
}

async fn insert(store: &dyn Store, statement: Statement) -> anyhow::Result<i32> {
    store
        .execute(statement)
        .await?
        .inserted_id()
        .ok_or_else(|| anyhow::anyhow!("no id"))
}

async fn ids_are_unique_and_increasing(store: &dyn Store) -> anyhow::Result<()> {
    let a = insert(store, Statement::InsertShop(new_shop("a"))).await?;
    let b = insert(store, Statement::InsertShop(new_shop("b"))).await?;
    assert!(b > a);
    let p1 = insert(store, Statement::InsertProduct(new_product(a, "x"))).await?;
    let p2 = insert(store, Statement::InsertProduct(new_product(b, "y"))).await?;
    assert!(p2 > p1);
    Ok(())
}

async fn duplicate_subdomain_is_a_constraint_violation(store: &dyn Store) -> anyhow::Result<()> {
    insert(store, Statement::InsertShop(new_shop("dup"))).await?;
    let err = store.execute(Statement::InsertShop(new_shop("dup"))).await.unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)), "{err:?}");
    let shops = store.execute(Statement::ListShops { order: Order::Insertion }).await?.into_shops()?;
    assert_eq!(shops.len(), 1);
    Ok(())
}

async fn orphan_product_is_a_constraint_violation(store: &dyn Store) -> anyhow::Result<()> {
    let err = store.execute(Statement::InsertProduct(new_product(404, "ghost"))).await.unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)), "{err:?}");
    let products = store
        .execute(Statement::ListProducts { shop_id: None, order: Order::Insertion })
        .await?
        .into_products()?;
    assert!(products.is_empty());
    Ok(())
}

async fn delete_cascades_and_ids_are_not_reused(store: &dyn Store) -> anyhow::Result<()> {
    let keep = insert(store, Statement::InsertShop(new_shop("keep"))).await?;
    let gone = insert(store, Statement::InsertShop(new_shop("gone"))).await?;
    insert(store, Statement::InsertProduct(new_product(keep, "k"))).await?;
    insert(store, Statement::InsertProduct(new_product(gone, "g1"))).await?;
    insert(store, Statement::InsertProduct(new_product(gone, "g2"))).await?;

    let outcome = store.execute(Statement::DeleteShop { id: gone }).await?;
    assert_eq!(outcome.changes(), 1);
    assert_eq!(store.execute(Statement::DeleteShop { id: gone }).await?.changes(), 0);

    let products = store
        .execute(Statement::ListProducts { shop_id: None, order: Order::Insertion })
        .await?
        .into_products()?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].shop_id, keep);

    let next = insert(store, Statement::InsertShop(new_shop("next"))).await?;
    assert!(next > gone);
    Ok(())
}

async fn lookups_and_ordering(store: &dyn Store) -> anyhow::Result<()> {
    let a = insert(store, Statement::InsertShop(new_shop("alpha"))).await?;
    let b = insert(store, Statement::InsertShop(new_shop("beta"))).await?;

    let found = store
        .execute(Statement::FindShopBySubdomain { subdomain: "beta".into() })
        .await?
        .into_shops()?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, b);
    assert_eq!(found[0].name, "BETA");
    let missing = store.execute(Statement::FindShopById { id: 999 }).await?.into_shops()?;
    assert!(missing.is_empty());

    let newest: Vec<i32> = store
        .execute(Statement::ListShops { order: Order::NewestFirst })
        .await?
        .into_shops()?
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(newest, vec![b, a]);

    let p1 = insert(store, Statement::InsertProduct(new_product(a, "one"))).await?;
    insert(store, Statement::InsertProduct(new_product(b, "other"))).await?;
    let p3 = insert(store, Statement::InsertProduct(new_product(a, "two"))).await?;
    let filtered: Vec<i32> = store
        .execute(Statement::ListProducts { shop_id: Some(a), order: Order::NewestFirst })
        .await?
        .into_products()?
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(filtered, vec![p3, p1]);

    let product = store.execute(Statement::FindProductById { id: p1 }).await?.into_products()?;
    assert_eq!(product[0].description, "");
    assert_eq!(product[0].stock, 2);
    assert_eq!(product[0].price, 1.5);
    Ok(())
}

macro_rules! conformance {
    ($($name:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() -> anyhow::Result<()> {
                    let store = super::memory_store().await;
                    super::$name(&store).await
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() -> anyhow::Result<()> {
                    let (store, path) = super::sql_store().await?;
                    let result = super::$name(&store).await;
                    store.close().await?;
                    let _ = std::fs::remove_file(path);
                    result
                }
            )*
        }
    };
}

conformance!(
    ids_are_unique_and_increasing,
    duplicate_subdomain_is_a_constraint_violation,
    orphan_product_is_a_constraint_violation,
    delete_cascades_and_ids_are_not_reused,
    lookups_and_ordering,
);
