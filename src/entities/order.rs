//! Order entity - A customer order with snapshotted shipping details.
//!
//! Customer name, phone, address, and location are copied onto the row at
//! creation time; the row never reads back through `bot_users`. The status
//! column stores the canonical English status string - legacy Arabic
//! synonyms from the pre-migration data set are accepted when parsing.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Telegram id of the ordering customer
    pub telegram_id: i64,
    /// Customer display name snapshot
    pub user_name: String,
    /// Customer phone snapshot
    pub user_phone: String,
    /// Shipping address snapshot
    pub user_address: String,
    /// Shipping state/governorate
    pub user_state: Option<String>,
    /// Shipping region within the state
    pub user_region: Option<String>,
    /// Customer's chat username, if any
    pub username: Option<String>,
    /// Total order amount
    pub total_amount: f64,
    /// Canonical status string, see [`OrderStatus`]
    pub status: String,
    /// When the order was placed
    pub order_date: DateTimeUtc,
    /// When the status last changed
    pub status_update: DateTimeUtc,
    /// Free-form staff notes
    pub notes: Option<String>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parses the stored status string leniently. Rows written by this crate
    /// always hold a canonical value; rows migrated from the old store may
    /// hold a legacy synonym.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStatus`] for unrecognized strings.
    pub fn status(&self) -> crate::errors::Result<OrderStatus> {
        self.status.parse()
    }
}

/// Order lifecycle status.
///
/// The documented state machine is
/// `pending -> {confirmed, cancelled}`, `confirmed -> {shipped, cancelled}`,
/// `shipped -> {delivered, cancelled}`; `delivered` and `cancelled` are
/// terminal. Transitions are stored rather than gated (staff use free status
/// changes for corrections); [`OrderStatus::can_transition_to`] lets adapters
/// warn about departures from the graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Canonical string stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Arabic display label for adapter boundaries.
    #[must_use]
    pub const fn arabic_label(self) -> &'static str {
        match self {
            Self::Pending => "معلق",
            Self::Confirmed => "مؤكد",
            Self::Shipped => "تم الشحن",
            Self::Delivered => "تم التوصيل",
            Self::Cancelled => "ملغي",
        }
    }

    /// Whether no further transitions are expected from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `next` follows this status in the documented state machine.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(next, Self::Shipped | Self::Cancelled),
            Self::Shipped => matches!(next, Self::Delivered | Self::Cancelled),
            Self::Delivered | Self::Cancelled => false,
        }
    }

    /// Whether an order in this status may still be deleted. Delivered
    /// orders are financial records and must not disappear.
    #[must_use]
    pub const fn is_deletable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Shipped)
    }

    /// Whether a change *to* this status should notify the customer.
    #[must_use]
    pub const fn notifies_customer(self) -> bool {
        matches!(self, Self::Confirmed | Self::Shipped | Self::Delivered)
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    /// Accepts canonical English statuses plus the legacy synonyms found in
    /// the pre-migration data set. `completed` and its Arabic form map to
    /// `Delivered`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "معلق" => Ok(Self::Pending),
            "confirmed" | "مؤكد" => Ok(Self::Confirmed),
            "shipped" | "مشحون" | "تم الشحن" => Ok(Self::Shipped),
            "delivered" | "completed" | "تم التوصيل" | "مكتمل" => Ok(Self::Delivered),
            "cancelled" | "canceled" | "ملغي" => Ok(Self::Cancelled),
            other => Err(Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_canonical() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(
            "delivered".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_status_parse_legacy_synonyms() {
        assert_eq!("معلق".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("مؤكد".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert_eq!("تم الشحن".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        // The old store used "completed" and "مكتمل" interchangeably with delivered
        assert_eq!(
            "completed".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivered
        );
        assert_eq!("مكتمل".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
    }

    #[test]
    fn test_status_parse_unknown() {
        assert!("sideways".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_transition_graph() {
        use OrderStatus as S;
        assert!(S::Pending.can_transition_to(S::Confirmed));
        assert!(S::Pending.can_transition_to(S::Cancelled));
        assert!(!S::Pending.can_transition_to(S::Delivered));
        assert!(S::Confirmed.can_transition_to(S::Shipped));
        assert!(S::Shipped.can_transition_to(S::Delivered));
        assert!(!S::Delivered.can_transition_to(S::Pending));
        assert!(!S::Cancelled.can_transition_to(S::Pending));
    }

    #[test]
    fn test_deletability_gate() {
        assert!(OrderStatus::Pending.is_deletable());
        assert!(OrderStatus::Confirmed.is_deletable());
        assert!(OrderStatus::Shipped.is_deletable());
        assert!(!OrderStatus::Delivered.is_deletable());
        assert!(!OrderStatus::Cancelled.is_deletable());
    }

    #[test]
    fn test_notification_qualification() {
        assert!(OrderStatus::Confirmed.notifies_customer());
        assert!(OrderStatus::Shipped.notifies_customer());
        assert!(OrderStatus::Delivered.notifies_customer());
        assert!(!OrderStatus::Pending.notifies_customer());
        assert!(!OrderStatus::Cancelled.notifies_customer());
    }
}
