//! Inventory ledger - stock truth and its audit trail.
//!
//! Variant quantities only ever change through [`set_quantity`], which pairs
//! every write with exactly one `inventory_history` entry. Availability checks
//! are side-effect free and generic over the connection so the order engine
//! can run them inside its own transaction.

use crate::entities::{
    inventory_history, variant, ChangeType, InventoryHistory, InventoryHistoryColumn,
    InventoryHistoryModel, Variant, VariantColumn, VariantModel,
};
use crate::errors::{Error, Result};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::info;

/// Why a requested quantity cannot be fulfilled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StockIssue {
    /// No variant exists for this product/color/size combination
    UnknownVariant,
    /// The variant exists but has zero stock
    OutOfStock,
    /// The variant has stock, just not enough
    Insufficient,
}

impl std::fmt::Display for StockIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariant => write!(f, "variant not available"),
            Self::OutOfStock => write!(f, "out of stock"),
            Self::Insufficient => write!(f, "insufficient stock"),
        }
    }
}

/// Result of a side-effect-free stock availability check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    /// Whether the requested quantity can be fulfilled right now
    pub available: bool,
    /// Stock on hand (0 when the variant is unknown)
    pub current_stock: i32,
    /// The quantity that was asked for
    pub requested: i32,
    /// Set when `available` is false
    pub issue: Option<StockIssue>,
}

/// Looks up a variant by its product/color/size coordinates.
pub async fn find_variant<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    color: &str,
    size: &str,
) -> Result<Option<VariantModel>> {
    Variant::find()
        .filter(VariantColumn::ProductId.eq(product_id))
        .filter(VariantColumn::Color.eq(color))
        .filter(VariantColumn::Size.eq(size))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Checks whether `requested` units of a variant can be fulfilled.
///
/// Fails closed: an unknown variant reports unavailable rather than erroring,
/// so a cart referencing a deleted variant degrades to a rejection instead of
/// a crash. Distinguishes unknown variant / zero stock / insufficient stock
/// in the returned issue.
pub async fn check_availability<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    color: &str,
    size: &str,
    requested: i32,
) -> Result<Availability> {
    let variant = find_variant(conn, product_id, color, size).await?;

    Ok(match variant {
        None => Availability {
            available: false,
            current_stock: 0,
            requested,
            issue: Some(StockIssue::UnknownVariant),
        },
        Some(v) if v.quantity == 0 => Availability {
            available: false,
            current_stock: 0,
            requested,
            issue: Some(StockIssue::OutOfStock),
        },
        Some(v) if v.quantity < requested => Availability {
            available: false,
            current_stock: v.quantity,
            requested,
            issue: Some(StockIssue::Insufficient),
        },
        Some(v) => Availability {
            available: true,
            current_stock: v.quantity,
            requested,
            issue: None,
        },
    })
}

/// Sets a variant's quantity and appends the matching history entry.
///
/// This is the sole quantity mutation path in the crate. The delta is computed
/// against the stored value, the variant row is updated, and exactly one
/// `inventory_history` row is written in the same connection (callers wanting
/// atomicity pass a transaction). Non-negativity is not re-validated here:
/// administrative corrections may set any value, and the order path has
/// already checked availability inside its transaction.
///
/// # Errors
/// Returns [`Error::VariantNotFound`] when the coordinates match no variant.
pub async fn set_quantity<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    color: &str,
    size: &str,
    new_quantity: i32,
    change_type: ChangeType,
    reason: &str,
) -> Result<VariantModel> {
    let variant = find_variant(conn, product_id, color, size)
        .await?
        .ok_or_else(|| Error::VariantNotFound {
            product_id,
            color: color.to_string(),
            size: size.to_string(),
        })?;

    let old_quantity = variant.quantity;
    let now = chrono::Utc::now();

    let mut active: variant::ActiveModel = variant.into();
    active.quantity = Set(new_quantity);
    active.updated_at = Set(now);
    let updated = active.update(conn).await?;

    inventory_history::ActiveModel {
        product_id: Set(product_id),
        variant_id: Set(updated.id),
        change_type: Set(change_type.as_str().to_string()),
        old_quantity: Set(old_quantity),
        new_quantity: Set(new_quantity),
        change_amount: Set(new_quantity - old_quantity),
        reason: Set(reason.to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    info!(
        variant_id = updated.id,
        old_quantity,
        new_quantity,
        change_type = %change_type,
        reason,
        "Stock updated"
    );

    Ok(updated)
}

/// Manual stock correction by staff, recorded as an adjustment.
///
/// Runs in its own transaction so the variant update and the history entry
/// land together.
pub async fn adjust_stock(
    db: &DatabaseConnection,
    product_id: i64,
    color: &str,
    size: &str,
    new_quantity: i32,
    reason: &str,
) -> Result<VariantModel> {
    let txn = db.begin().await?;
    let updated = set_quantity(
        &txn,
        product_id,
        color,
        size,
        new_quantity,
        ChangeType::Adjustment,
        reason,
    )
    .await?;
    txn.commit().await?;
    Ok(updated)
}

/// Lists a product's in-stock variants, ordered by color then size.
pub async fn list_available_variants(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<VariantModel>> {
    Variant::find()
        .filter(VariantColumn::ProductId.eq(product_id))
        .filter(VariantColumn::Quantity.gt(0))
        .order_by_asc(VariantColumn::Color)
        .order_by_asc(VariantColumn::Size)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns a variant's history entries in time order, oldest first.
pub async fn history_for_variant(
    db: &DatabaseConnection,
    variant_id: i64,
) -> Result<Vec<InventoryHistoryModel>> {
    InventoryHistory::find()
        .filter(InventoryHistoryColumn::VariantId.eq(variant_id))
        .order_by_asc(InventoryHistoryColumn::CreatedAt)
        .order_by_asc(InventoryHistoryColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
