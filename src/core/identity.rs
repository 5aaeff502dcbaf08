//! Identity and access - staff accounts, password hashing, and permissions.
//!
//! Passwords are stored as `salt$digest` where digest is SHA-256 over the
//! salt concatenated with the password. Authorization is role-based with
//! optional per-user JSON overrides stored on the account row; an admin's
//! permission set is simply the universal set, there is no bypass branch
//! anywhere.

use crate::entities::{staff_user, StaffUser, StaffUserColumn, StaffUserModel};
use crate::errors::{Error, Result};
use rand::RngCore;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use tracing::info;

/// A staff capability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Permission {
    ViewProducts,
    ManageProducts,
    ViewOrders,
    ManageOrders,
    ViewInventory,
    ManageInventory,
    ViewReports,
    ViewActivity,
    ManageStaff,
}

impl Permission {
    /// Every capability, in a stable order.
    pub const ALL: &'static [Self] = &[
        Self::ViewProducts,
        Self::ManageProducts,
        Self::ViewOrders,
        Self::ManageOrders,
        Self::ViewInventory,
        Self::ManageInventory,
        Self::ViewReports,
        Self::ViewActivity,
        Self::ManageStaff,
    ];

    /// Stable string used in JSON overrides.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewProducts => "view_products",
            Self::ManageProducts => "manage_products",
            Self::ViewOrders => "view_orders",
            Self::ManageOrders => "manage_orders",
            Self::ViewInventory => "view_inventory",
            Self::ManageInventory => "manage_inventory",
            Self::ViewReports => "view_reports",
            Self::ViewActivity => "view_activity",
            Self::ManageStaff => "manage_staff",
        }
    }
}

/// Staff role. Legacy accounts may store `user`, which maps to Viewer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    OrderManager,
    Viewer,
}

impl Role {
    /// Canonical string stored in the `role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::OrderManager => "order_manager",
            Self::Viewer => "viewer",
        }
    }

    /// The role's capability set. Admin holds every capability; there is no
    /// separate admin check elsewhere.
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Admin => Permission::ALL,
            Self::OrderManager => &[
                Permission::ViewProducts,
                Permission::ViewOrders,
                Permission::ManageOrders,
                Permission::ViewInventory,
            ],
            Self::Viewer => &[
                Permission::ViewProducts,
                Permission::ViewOrders,
                Permission::ViewInventory,
                Permission::ViewReports,
            ],
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "order_manager" => Ok(Self::OrderManager),
            "viewer" | "user" => Ok(Self::Viewer),
            other => Err(Error::Config {
                message: format!("Unknown staff role '{other}'"),
            }),
        }
    }
}

/// Hashes a password with a fresh random salt, `salt$digest` format.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);
    let digest = salted_digest(&salt, password);
    format!("{salt}${digest}")
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a password against a stored `salt$digest` hash. Digest comparison
/// does not short-circuit.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let actual = salted_digest(salt, password);
    if actual.len() != expected.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Whether a staff account holds a capability: the JSON override set when
/// present, otherwise the role's set.
pub fn has_permission(user: &StaffUserModel, permission: Permission) -> Result<bool> {
    if let Some(overrides) = &user.permissions {
        let names: Vec<String> = serde_json::from_str(overrides)?;
        return Ok(names.iter().any(|n| n == permission.as_str()));
    }
    let role: Role = user.role.parse()?;
    Ok(role.permissions().contains(&permission))
}

/// Creates a staff account.
///
/// # Errors
/// [`Error::DuplicateUsername`] when the username is taken.
pub async fn create_staff_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
    full_name: Option<&str>,
) -> Result<StaffUserModel> {
    let existing = StaffUser::find()
        .filter(StaffUserColumn::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateUsername {
            username: username.to_string(),
        });
    }

    let created = staff_user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)),
        role: Set(role.as_str().to_string()),
        permissions: Set(None),
        is_active: Set(true),
        full_name: Set(full_name.map(ToString::to_string)),
        created_at: Set(chrono::Utc::now()),
        last_login: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(username, role = role.as_str(), "Created staff user");
    Ok(created)
}

/// Checks credentials for an active account and stamps `last_login`.
/// Returns None for unknown usernames, wrong passwords, and disabled
/// accounts alike.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<StaffUserModel>> {
    let Some(user) = StaffUser::find()
        .filter(StaffUserColumn::Username.eq(username))
        .filter(StaffUserColumn::IsActive.eq(true))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash) {
        return Ok(None);
    }

    let mut active: staff_user::ActiveModel = user.into();
    active.last_login = Set(Some(chrono::Utc::now()));
    let updated = active.update(db).await?;
    info!(username, "Staff login");
    Ok(Some(updated))
}

/// Optional field updates for a staff account. Unset fields keep their value.
#[derive(Clone, Debug, Default)]
pub struct StaffUpdate {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub full_name: Option<String>,
    /// Some(set) installs an override, Some(empty) revokes everything;
    /// use [`clear_permission_overrides`] to fall back to the role set.
    pub permissions: Option<Vec<Permission>>,
}

async fn find_staff(db: &DatabaseConnection, username: &str) -> Result<StaffUserModel> {
    StaffUser::find()
        .filter(StaffUserColumn::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: username.to_string(),
        })
}

/// Applies the set fields of `update` to a staff account.
pub async fn update_staff_user(
    db: &DatabaseConnection,
    username: &str,
    update: StaffUpdate,
) -> Result<StaffUserModel> {
    let existing = find_staff(db, username).await?;

    let mut active: staff_user::ActiveModel = existing.into();
    if let Some(role) = update.role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(full_name) = update.full_name {
        active.full_name = Set(Some(full_name));
    }
    if let Some(perms) = update.permissions {
        let names: Vec<&str> = perms.iter().map(|p| p.as_str()).collect();
        active.permissions = Set(Some(serde_json::to_string(&names)?));
    }
    active.update(db).await.map_err(Into::into)
}

/// Removes a per-user permission override so the role set applies again.
pub async fn clear_permission_overrides(
    db: &DatabaseConnection,
    username: &str,
) -> Result<StaffUserModel> {
    let existing = find_staff(db, username).await?;
    let mut active: staff_user::ActiveModel = existing.into();
    active.permissions = Set(None);
    active.update(db).await.map_err(Into::into)
}

/// Rehashes and stores a new password with a fresh salt.
pub async fn change_password(
    db: &DatabaseConnection,
    username: &str,
    new_password: &str,
) -> Result<()> {
    let existing = find_staff(db, username).await?;
    let mut active: staff_user::ActiveModel = existing.into();
    active.password_hash = Set(hash_password(new_password));
    active.update(db).await?;
    info!(username, "Staff password changed");
    Ok(())
}

/// Removes a staff account entirely. Activity log rows keep the username.
pub async fn delete_staff_user(db: &DatabaseConnection, username: &str) -> Result<()> {
    let existing = find_staff(db, username).await?;
    existing.delete(db).await?;
    info!(username, "Deleted staff user");
    Ok(())
}

/// All staff accounts, oldest first.
pub async fn list_staff_users(db: &DatabaseConnection) -> Result<Vec<StaffUserModel>> {
    StaffUser::find()
        .order_by_asc(StaffUserColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let stored = hash_password("s3cret");
        assert!(stored.contains('$'));
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("wrong", &stored));
        assert!(!verify_password("s3cret", "garbage-without-separator"));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_role_permission_sets() {
        assert_eq!(Role::Admin.permissions(), Permission::ALL);
        assert!(Role::OrderManager
            .permissions()
            .contains(&Permission::ManageOrders));
        assert!(!Role::OrderManager
            .permissions()
            .contains(&Permission::ManageStaff));
        assert!(!Role::Viewer.permissions().contains(&Permission::ManageOrders));
        // Legacy role name from the old store
        assert_eq!("user".parse::<Role>().unwrap(), Role::Viewer);
    }

    #[tokio::test]
    async fn test_create_and_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        create_staff_user(&db, "maya", "pass123", Role::OrderManager, Some("Maya")).await?;

        let user = authenticate(&db, "maya", "pass123").await?.unwrap();
        assert!(user.last_login.is_some());
        assert!(authenticate(&db, "maya", "nope").await?.is_none());
        assert!(authenticate(&db, "ghost", "pass123").await?.is_none());

        assert!(matches!(
            create_staff_user(&db, "maya", "other", Role::Viewer, None).await,
            Err(Error::DuplicateUsername { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_login() -> Result<()> {
        let db = setup_test_db().await?;
        create_staff_user(&db, "maya", "pass123", Role::Viewer, None).await?;
        update_staff_user(
            &db,
            "maya",
            StaffUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        assert!(authenticate(&db, "maya", "pass123").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_permission_overrides_beat_role() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_staff_user(&db, "maya", "pass123", Role::Viewer, None).await?;
        assert!(!has_permission(&user, Permission::ManageOrders)?);

        let user = update_staff_user(
            &db,
            "maya",
            StaffUpdate {
                permissions: Some(vec![Permission::ManageOrders]),
                ..Default::default()
            },
        )
        .await?;
        assert!(has_permission(&user, Permission::ManageOrders)?);
        // The override replaces the role set, it does not extend it
        assert!(!has_permission(&user, Permission::ViewProducts)?);

        let user = clear_permission_overrides(&db, "maya").await?;
        assert!(has_permission(&user, Permission::ViewProducts)?);
        Ok(())
    }

    #[tokio::test]
    async fn test_change_password() -> Result<()> {
        let db = setup_test_db().await?;
        create_staff_user(&db, "maya", "old", Role::Viewer, None).await?;
        change_password(&db, "maya", "new").await?;

        assert!(authenticate(&db, "maya", "old").await?.is_none());
        assert!(authenticate(&db, "maya", "new").await?.is_some());
        Ok(())
    }
}
