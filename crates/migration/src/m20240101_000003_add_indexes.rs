use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Products: index on shop_id for the per-shop listing
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_shop_id")
                    .table(Products::Table)
                    .col(Products::ShopId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_products_shop_id").table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products { Table, ShopId }
