//! Product entity - A sellable article within a category.
//!
//! The product row carries the live price and description; historical orders
//! snapshot both into `order_items` so later edits never rewrite history.
//! Stock is never tracked here - the unit of stock truth is the variant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning category
    pub category_id: i64,
    /// Product name
    pub name: String,
    /// Current unit price (snapshots in order items are decoupled from this)
    pub price: f64,
    /// Free-form description
    pub description: String,
    /// Unique manufacturer model number, if assigned
    #[sea_orm(unique)]
    pub model_number: Option<String>,
    /// Soft-delete / visibility flag
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product has many variants
    #[sea_orm(has_many = "super::variant::Entity")]
    Variants,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
