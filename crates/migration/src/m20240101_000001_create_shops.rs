//! Create `shops` table.
//!
//! Root entity for multi-tenancy; `products` references it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(pk_auto(Shops::Id))
                    .col(string(Shops::Name))
                    .col(string(Shops::Subdomain).unique_key())
                    .col(string(Shops::OwnerEmail))
                    .col(timestamp_with_time_zone(Shops::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Shops::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Shops::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Shops { Table, Id, Name, Subdomain, OwnerEmail, CreatedAt, UpdatedAt }
