//! Order item entity - One line of an order.
//!
//! `product_name` and `price` are snapshots taken at order time so historical
//! orders stay readable and priced correctly even if the product is later
//! renamed, repriced, or deleted. `product_id` and `variant_id` are plain
//! columns without foreign keys for the same reason: deleting catalog rows
//! must never invalidate past orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order
    pub order_id: i64,
    /// Referenced product
    pub product_id: i64,
    /// Resolved variant, when the item specified color and size
    pub variant_id: Option<i64>,
    /// Product name snapshot at order time
    pub product_name: String,
    /// Unit price snapshot at order time
    pub price: f64,
    /// Units ordered
    pub quantity: i32,
    /// Chosen color, if the product has variants
    pub color: Option<String>,
    /// Chosen size, if the product has variants
    pub size: Option<String>,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
