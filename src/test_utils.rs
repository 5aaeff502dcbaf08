//! Shared test utilities for store-ops.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{catalog, order::CustomerInfo},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product under a default "Clothing" category.
///
/// # Defaults
/// * category: "Clothing"
/// * description / model number: None
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::product::Model> {
    catalog::add_product(db, "Clothing", name, price, None, None).await
}

/// Creates a test variant with the given starting stock.
pub async fn create_test_variant(
    db: &DatabaseConnection,
    product_id: i64,
    color: &str,
    size: &str,
    quantity: i32,
) -> Result<entities::variant::Model> {
    catalog::upsert_variant(db, product_id, color, size, quantity, None).await
}

/// A customer info block with sensible defaults for order tests.
#[must_use]
pub fn test_customer() -> CustomerInfo {
    CustomerInfo {
        telegram_id: 555_001,
        name: "Test Customer".to_string(),
        phone: "0991234567".to_string(),
        address: "12 Test Street".to_string(),
        state: Some("Damascus".to_string()),
        region: Some("Mazzeh".to_string()),
        username: Some("testcustomer".to_string()),
    }
}

/// Sets up a complete test environment with one product and one stocked
/// variant. Returns (db, product, variant) for order-related tests.
pub async fn setup_with_stock() -> Result<(
    DatabaseConnection,
    entities::product::Model,
    entities::variant::Model,
)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Test Shirt", 25.0).await?;
    let variant = create_test_variant(&db, product.id, "Red", "M", 10).await?;
    Ok((db, product, variant))
}
