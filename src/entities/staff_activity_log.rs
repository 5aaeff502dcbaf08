//! Staff activity log entity - Append-only audit of dashboard actions.
//! Rows are inserted once and never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff activity log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Acting staff user id
    pub user_id: i64,
    /// Username snapshot at log time
    pub username: Option<String>,
    /// Full name snapshot at log time
    pub full_name: Option<String>,
    /// Machine-readable action kind (e.g. `"order_status_update"`)
    pub action_type: String,
    /// Human-readable description of what happened
    pub action_description: String,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    /// Value before the change, when applicable
    pub old_value: Option<String>,
    /// Value after the change, when applicable
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
