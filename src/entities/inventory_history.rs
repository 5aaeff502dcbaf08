//! Inventory history entity - Append-only audit trail of stock changes.
//!
//! Every quantity mutation records exactly one entry here with the quantity
//! before, the quantity after, and the signed delta. Entries are never
//! updated or deleted; for a given variant, replaying entries in time order
//! reproduces its current quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_history")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product the mutated variant belongs to
    pub product_id: i64,
    /// The mutated variant
    pub variant_id: i64,
    /// Kind of change: `"sale"`, `"restock"`, or `"adjustment"`
    pub change_type: String,
    /// Quantity before the change
    pub old_quantity: i32,
    /// Quantity after the change
    pub new_quantity: i32,
    /// Signed delta; invariant: `new_quantity == old_quantity + change_amount`
    pub change_amount: i32,
    /// Human-readable reason (e.g. `"Order #42"`)
    pub reason: String,
    /// When the change happened
    pub created_at: DateTimeUtc,
}

/// No foreign keys: ledger entries outlive the variants they describe, so a
/// hard-deleted variant keeps its audit trail.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Why a variant's quantity changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeType {
    /// Stock left the store as part of an order
    Sale,
    /// Stock came back (cancellation, deletion, resupply)
    Restock,
    /// Manual correction by staff
    Adjustment,
}

impl ChangeType {
    /// Canonical string stored in the `change_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Restock => "restock",
            Self::Adjustment => "adjustment",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
