//! Size option entity - Predefined size codes offered to adapters so
//! keyboards and pickers stay consistent across the store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Size option database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "size_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Size code (e.g. "M", "XL"), unique
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
