use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, fields, shop};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub shop_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Shop }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Shop => Entity::belongs_to(shop::Entity)
                .from(Column::ShopId)
                .to(shop::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<shop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Validated input for a product insert. `shop_id` existence is checked by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub shop_id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

impl NewProduct {
    pub fn new(
        shop_id: i32,
        name: &str,
        description: Option<&str>,
        price: f64,
        stock: Option<i64>,
    ) -> Result<Self, errors::ModelError> {
        let name = fields::validate_name("name", name)?;
        let price = fields::validate_price(price)?;
        let stock = fields::validate_stock(stock.unwrap_or(0))?;
        Ok(Self {
            shop_id,
            name,
            description: description.unwrap_or_default().to_string(),
            price,
            stock,
        })
    }

    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            shop_id: Set(self.shop_id),
            name: Set(self.name),
            description: Set(self.description),
            price: Set(self.price),
            stock: Set(self.stock),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    pub fn into_model(self, id: i32, now: DateTimeUtc) -> Model {
        Model {
            id,
            shop_id: self.shop_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}
