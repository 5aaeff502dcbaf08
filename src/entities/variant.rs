//! Variant entity - A specific color+size combination of a product.
//!
//! This is the unit of sale and the unit of stock truth: all inventory
//! arithmetic operates at this granularity, never at the product level.
//! `quantity` may only change through `core::inventory::set_quantity` so the
//! history chain in `inventory_history` stays consistent. Uniqueness of
//! (product, color, size) is enforced by an index created during schema
//! upgrade, since composite uniques cannot be expressed on the entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product variant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    /// Unique identifier for the variant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_id: i64,
    /// Color code (e.g. "Red")
    pub color: String,
    /// Size code (e.g. "M")
    pub size: String,
    /// Units currently in stock
    pub quantity: i32,
    /// Threshold below which the variant counts as low stock
    pub min_stock_alert: i32,
    /// Optional path to a per-color product image
    pub image_path: Option<String>,
    /// When the variant was created
    pub created_at: DateTimeUtc,
    /// When the variant was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Variant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each variant belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
