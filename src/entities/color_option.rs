//! Color option entity - Predefined color codes offered to adapters so
//! keyboards and pickers stay consistent across the store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Color option database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "color_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Color code (e.g. "Red"), unique
    #[sea_orm(unique)]
    pub code: String,
    /// Localized display name
    pub display_name: String,
    /// Sort order in pickers
    pub display_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
