//! Client activity log entity - Append-only trail of customer/bot actions
//! (browsing, cart adds, orders). Rows are inserted once and never touched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client activity log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Acting customer's telegram id
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Machine-readable activity kind (e.g. `"add_to_cart"`)
    pub activity_type: String,
    /// Human-readable description
    pub activity_description: String,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    /// JSON blob with activity-specific detail (color, size, amounts, ...)
    pub metadata: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
