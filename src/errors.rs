//! Unified error types and result handling.
//!
//! Business-rule outcomes (insufficient stock, non-deletable status) are NOT
//! errors: they are structured return values in [`crate::core::order`] so
//! adapters can always render per-item detail. The variants here cover input
//! validation, missing entities, and storage failures. A storage failure
//! inside a transaction rolls the whole transaction back when it is dropped.

use thiserror::Error;

/// Unified error type for all store operations.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Config file parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Product {id} not found")]
    ProductNotFound { id: i64 },

    #[error("No variant of product {product_id} with color {color} and size {size}")]
    VariantNotFound {
        product_id: i64,
        color: String,
        size: String,
    },

    #[error("Order #{id} not found")]
    OrderNotFound { id: i64 },

    #[error("Staff user {username} not found")]
    UserNotFound { username: String },

    #[error("Username {username} already exists")]
    DuplicateUsername { username: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i32 },

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Unrecognized order status: {value}")]
    InvalidStatus { value: String },

    #[error("Notification delivery failed: {message}")]
    Notification { message: String },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
