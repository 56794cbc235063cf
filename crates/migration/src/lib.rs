//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
//!
//! Every statement is written with `IF NOT EXISTS`, so applying the schema to a
//! database created by an earlier build (without a `seaql_migrations` table) is
//! still a no-op.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_shops;
mod m20240101_000002_create_products;
mod m20240101_000003_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_shops::Migration),
            Box::new(m20240101_000002_create_products::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000003_add_indexes::Migration),
        ]
    }
}
