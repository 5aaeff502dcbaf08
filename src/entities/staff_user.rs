//! Staff user entity - Dashboard accounts with role-derived permissions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff user database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique
    #[sea_orm(unique)]
    pub username: String,
    /// Salted password hash in `salt$digest` form
    pub password_hash: String,
    /// Role name, see `core::identity::Role`
    pub role: String,
    /// Optional JSON permission overrides; when absent the role's set applies
    pub permissions: Option<String>,
    /// Whether the account may log in
    pub is_active: bool,
    /// Display name
    pub full_name: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// Last successful authentication
    pub last_login: Option<DateTimeUtc>,
}

/// `StaffUser` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
