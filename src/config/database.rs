//! Database configuration module for the store.
//!
//! This module handles `SQLite` database connection, table creation, additive
//! schema upgrades, and first-run seeding using `SeaORM`. Table creation uses
//! `Schema::create_table_from_entity` so the database schema always matches
//! the entity definitions without manual SQL; the upgrade path covers the few
//! things the entity macros cannot express (columns added after release and
//! composite indexes).

use crate::entities::{
    BotUser, Category, ClientActivityLog, ColorOption, InventoryHistory, Order, OrderItem,
    Product, SizeOption, StaffActivityLog, StaffUser, Variant,
};
use crate::errors::Result;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Schema, Statement,
};
use tracing::info;

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/store.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is
/// set, and applies the connection pragmas the store relies on: WAL journaling
/// so dashboard reads do not block bot writes, and foreign key enforcement.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let db = Database::connect(get_database_url()).await?;

    db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
    db.execute_unprepared("PRAGMA foreign_keys=ON;").await?;

    Ok(db)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions.
///
/// Safe to call on every startup: each statement carries `IF NOT EXISTS`, so
/// existing tables (and their data) are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = vec![
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Variant),
        schema.create_table_from_entity(InventoryHistory),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
        schema.create_table_from_entity(BotUser),
        schema.create_table_from_entity(StaffUser),
        schema.create_table_from_entity(StaffActivityLog),
        schema.create_table_from_entity(ClientActivityLog),
        schema.create_table_from_entity(SizeOption),
        schema.create_table_from_entity(ColorOption),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    Ok(())
}

/// Returns true if `table` already has a column named `column`.
async fn has_column(db: &DatabaseConnection, table: &str, column: &str) -> Result<bool> {
    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_string(
            backend,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;

    for row in rows {
        let name: String = row.try_get("", "name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Applies additive schema upgrades that `create_tables` cannot express.
///
/// Databases created by earlier releases predate the `user_state` and
/// `user_region` order columns, so those are added here when missing. The
/// composite uniqueness of (product, color, size) on variants also lives here
/// because the entity macros only cover single-column constraints. Dropping or
/// rewriting columns is never done; existing data survives every upgrade.
pub async fn update_schema(db: &DatabaseConnection) -> Result<()> {
    if !has_column(db, "orders", "user_state").await? {
        info!("Adding user_state column to orders");
        db.execute_unprepared("ALTER TABLE orders ADD COLUMN user_state TEXT")
            .await?;
    }
    if !has_column(db, "orders", "user_region").await? {
        info!("Adding user_region column to orders");
        db.execute_unprepared("ALTER TABLE orders ADD COLUMN user_region TEXT")
            .await?;
    }

    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_variants_product_color_size \
         ON product_variants (product_id, color, size)",
    )
    .await?;
    db.execute_unprepared(
        "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
    )
    .await?;
    db.execute_unprepared(
        "CREATE INDEX IF NOT EXISTS idx_inventory_history_variant \
         ON inventory_history (variant_id)",
    )
    .await?;
    db.execute_unprepared(
        "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id)",
    )
    .await?;

    Ok(())
}

const DEFAULT_SIZES: &[&str] = &["S", "M", "L", "XL", "XXL", "XXXL"];
const DEFAULT_COLORS: &[&str] = &[
    "Red", "Blue", "Black", "White", "Green", "Yellow", "Pink", "Purple", "Orange", "Brown",
];

/// Seeds reference data and the initial admin account on first run.
///
/// Size and color options are inserted only when absent, so operator edits to
/// the option tables survive restarts. An admin staff account is created only
/// when no staff users exist at all; its password comes from
/// `ADMIN_INITIAL_PASSWORD` (default `admin123`) and should be changed
/// immediately after first login.
pub async fn seed_defaults(db: &DatabaseConnection) -> Result<()> {
    use crate::entities::{color_option, size_option};

    for (order, code) in DEFAULT_SIZES.iter().enumerate() {
        let existing = SizeOption::find()
            .filter(crate::entities::SizeOptionColumn::Code.eq(*code))
            .one(db)
            .await?;
        if existing.is_none() {
            size_option::ActiveModel {
                code: Set((*code).to_string()),
                display_name: Set((*code).to_string()),
                display_order: Set(i32::try_from(order).unwrap_or(i32::MAX)),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    for (order, code) in DEFAULT_COLORS.iter().enumerate() {
        let existing = ColorOption::find()
            .filter(crate::entities::ColorOptionColumn::Code.eq(*code))
            .one(db)
            .await?;
        if existing.is_none() {
            color_option::ActiveModel {
                code: Set((*code).to_string()),
                display_name: Set((*code).to_string()),
                display_order: Set(i32::try_from(order).unwrap_or(i32::MAX)),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    let staff_count = StaffUser::find().count(db).await?;
    if staff_count == 0 {
        let password =
            std::env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        crate::core::identity::create_staff_user(
            db,
            "admin",
            &password,
            crate::core::identity::Role::Admin,
            Some("Administrator"),
        )
        .await?;
        info!("Seeded default admin account");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{OrderModel, ProductModel, VariantModel};
    use sea_orm::QuerySelect;

    async fn memory_db() -> Result<DatabaseConnection> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = memory_db().await?;

        // Tables exist if we can query them
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<VariantModel> = Variant::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_idempotent() -> Result<()> {
        let db = memory_db().await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_schema_idempotent() -> Result<()> {
        let db = memory_db().await?;
        update_schema(&db).await?;
        update_schema(&db).await?;
        assert!(has_column(&db, "orders", "user_state").await?);
        assert!(has_column(&db, "orders", "user_region").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_defaults() -> Result<()> {
        let db = memory_db().await?;
        seed_defaults(&db).await?;

        let sizes = SizeOption::find().all(&db).await?;
        assert_eq!(sizes.len(), DEFAULT_SIZES.len());
        let colors = ColorOption::find().all(&db).await?;
        assert_eq!(colors.len(), DEFAULT_COLORS.len());
        let staff = StaffUser::find().all(&db).await?;
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].username, "admin");

        // A second pass must not duplicate anything
        seed_defaults(&db).await?;
        assert_eq!(SizeOption::find().count(&db).await?, DEFAULT_SIZES.len() as u64);
        assert_eq!(StaffUser::find().count(&db).await?, 1);
        Ok(())
    }
}
