use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, fields, product};

/// A tenant storefront, addressed by its unique subdomain.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shops")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub subdomain: String,
    pub owner_email: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Products,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Products => Entity::has_many(product::Entity).into() }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Validated input for a shop insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewShop {
    pub name: String,
    pub subdomain: String,
    pub owner_email: String,
}

impl NewShop {
    pub fn new(name: &str, subdomain: &str, owner_email: &str) -> Result<Self, errors::ModelError> {
        let name = fields::validate_name("name", name)?;
        fields::validate_subdomain(subdomain)?;
        fields::validate_email(owner_email)?;
        Ok(Self { name, subdomain: subdomain.to_string(), owner_email: owner_email.to_string() })
    }

    /// Row for the SQL backend; the id is assigned by the engine.
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            name: Set(self.name),
            subdomain: Set(self.subdomain),
            owner_email: Set(self.owner_email),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// Row for engines that assign ids themselves.
    pub fn into_model(self, id: i32, now: DateTimeUtc) -> Model {
        Model {
            id,
            name: self.name,
            subdomain: self.subdomain,
            owner_email: self.owner_email,
            created_at: now,
            updated_at: now,
        }
    }
}
