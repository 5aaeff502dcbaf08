//! Order engine - atomic order placement, lifecycle, and deletion.
//!
//! Placement is all-or-nothing: every item is availability-checked inside the
//! same transaction that performs the stock decrement, all failures are
//! collected before deciding, and a rejection leaves the store byte-for-byte
//! unchanged. Business rejections ([`OrderOutcome::Rejected`],
//! [`DeleteOutcome::Rejected`]) are return values, not errors; `Err` means
//! the system itself failed.

use crate::core::{inventory, users};
use crate::entities::{
    order, order_item, ChangeType, Order, OrderItem, OrderItemColumn, OrderItemModel, OrderModel,
    OrderStatus, Product,
};
use crate::errors::{Error, Result};
use crate::notify::{Notification, NotificationKind, NotificationService};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, warn};

/// Customer details snapshotted onto the order row.
#[derive(Clone, Debug)]
pub struct CustomerInfo {
    pub telegram_id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub state: Option<String>,
    pub region: Option<String>,
    pub username: Option<String>,
}

/// One line of a new order. Color and size are both set for variant-tracked
/// products and both None for products sold without variants.
#[derive(Clone, Debug)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub color: Option<String>,
    pub size: Option<String>,
    /// Browse-time unit price from the caller's cart; the live product price
    /// is snapshotted when absent
    pub unit_price: Option<f64>,
    /// Browse-time display name; the live product name is snapshotted when
    /// absent
    pub display_name: Option<String>,
}

/// Why one line of an order could not be fulfilled.
#[derive(Clone, Debug)]
pub struct ItemRejection {
    pub product_id: i64,
    pub product_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub requested: i32,
    pub available: i32,
    pub issue: inventory::StockIssue,
}

/// Result of an order placement attempt.
#[derive(Clone, Debug)]
pub enum OrderOutcome {
    /// Order committed; stock decremented, buyer recorded.
    Placed { order_id: i64 },
    /// Nothing happened; one rejection per failing line.
    Rejected { errors: Vec<ItemRejection> },
}

/// Result of an order deletion attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Order and items removed, stock restored for `restored_items` lines.
    Deleted { restored_items: u32 },
    /// Order untouched.
    Rejected { status: String, reason: String },
}

/// An order with its line items.
#[derive(Clone, Debug)]
pub struct OrderWithItems {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}

/// Optional filters for order listings. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub order_id: Option<i64>,
}

/// Places an order atomically.
///
/// All items are validated inside one transaction, collecting every failure
/// before deciding. Any failure rejects the whole order with zero side
/// effects. On success the order and item rows are inserted, each
/// variant-tracked line decrements stock through the inventory ledger with
/// reason `Order #<id>`, and the customer is recorded as a buyer.
///
/// # Errors
/// [`Error::EmptyOrder`] for an empty item list, [`Error::InvalidQuantity`]
/// for a non-positive line quantity. Stock problems are not errors; they
/// come back as [`OrderOutcome::Rejected`].
pub async fn create_order(
    db: &DatabaseConnection,
    customer: &CustomerInfo,
    items: &[NewOrderItem],
    total_amount: f64,
    notes: Option<&str>,
) -> Result<OrderOutcome> {
    if items.is_empty() {
        return Err(Error::EmptyOrder);
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(Error::InvalidQuantity {
                quantity: item.quantity,
            });
        }
    }

    let txn = db.begin().await?;

    // Resolve products and collect every availability failure before
    // touching anything.
    let mut rejections = Vec::new();
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = Product::find_by_id(item.product_id).one(&txn).await?;
        let Some(product) = product else {
            rejections.push(ItemRejection {
                product_id: item.product_id,
                product_name: format!("product #{}", item.product_id),
                color: item.color.clone(),
                size: item.size.clone(),
                requested: item.quantity,
                available: 0,
                issue: inventory::StockIssue::UnknownVariant,
            });
            continue;
        };

        if let (Some(color), Some(size)) = (&item.color, &item.size) {
            let check =
                inventory::check_availability(&txn, product.id, color, size, item.quantity)
                    .await?;
            if !check.available {
                rejections.push(ItemRejection {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    color: item.color.clone(),
                    size: item.size.clone(),
                    requested: item.quantity,
                    available: check.current_stock,
                    issue: check.issue.unwrap_or(inventory::StockIssue::Insufficient),
                });
                continue;
            }
        }
        resolved.push((item, product));
    }

    if !rejections.is_empty() {
        // Dropping the transaction rolls back; nothing was written anyway
        info!(
            telegram_id = customer.telegram_id,
            failures = rejections.len(),
            "Order rejected"
        );
        return Ok(OrderOutcome::Rejected { errors: rejections });
    }

    let now = chrono::Utc::now();
    let order_row = order::ActiveModel {
        telegram_id: Set(customer.telegram_id),
        user_name: Set(customer.name.clone()),
        user_phone: Set(customer.phone.clone()),
        user_address: Set(customer.address.clone()),
        user_state: Set(customer.state.clone()),
        user_region: Set(customer.region.clone()),
        username: Set(customer.username.clone()),
        total_amount: Set(total_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        order_date: Set(now),
        status_update: Set(now),
        notes: Set(notes.map(ToString::to_string)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let sale_reason = format!("Order #{}", order_row.id);
    for (item, product) in resolved {
        let variant_id = match (&item.color, &item.size) {
            (Some(color), Some(size)) => {
                let variant = inventory::find_variant(&txn, product.id, color, size)
                    .await?
                    .ok_or_else(|| Error::VariantNotFound {
                        product_id: product.id,
                        color: color.clone(),
                        size: size.clone(),
                    })?;
                inventory::set_quantity(
                    &txn,
                    product.id,
                    color,
                    size,
                    variant.quantity - item.quantity,
                    ChangeType::Sale,
                    &sale_reason,
                )
                .await?;
                Some(variant.id)
            }
            _ => None,
        };

        order_item::ActiveModel {
            order_id: Set(order_row.id),
            product_id: Set(product.id),
            variant_id: Set(variant_id),
            product_name: Set(item
                .display_name
                .clone()
                .unwrap_or_else(|| product.name.clone())),
            price: Set(item.unit_price.unwrap_or(product.price)),
            quantity: Set(item.quantity),
            color: Set(item.color.clone()),
            size: Set(item.size.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    users::mark_buyer(
        &txn,
        customer.telegram_id,
        customer.username.as_deref(),
        Some(&customer.name),
        &customer.phone,
    )
    .await?;

    txn.commit().await?;
    info!(
        order_id = order_row.id,
        telegram_id = customer.telegram_id,
        total_amount,
        "Order placed"
    );
    Ok(OrderOutcome::Placed {
        order_id: order_row.id,
    })
}

/// Fetches one order with its items.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<OrderWithItems>> {
    let Some(order_row) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let items = OrderItem::find()
        .filter(OrderItemColumn::OrderId.eq(order_id))
        .all(db)
        .await?;
    Ok(Some(OrderWithItems {
        order: order_row,
        items,
    }))
}

/// Lists orders newest first, applying the set filters.
pub async fn list_orders(
    db: &DatabaseConnection,
    filter: &OrderFilter,
) -> Result<Vec<OrderWithItems>> {
    let mut query = Order::find().order_by_desc(crate::entities::OrderColumn::Id);
    if let Some(status) = filter.status {
        query = query.filter(crate::entities::OrderColumn::Status.eq(status.as_str()));
    }
    if let Some(state) = &filter.state {
        query = query.filter(crate::entities::OrderColumn::UserState.eq(state.as_str()));
    }
    if let Some(region) = &filter.region {
        query = query.filter(crate::entities::OrderColumn::UserRegion.eq(region.as_str()));
    }
    if let Some(order_id) = filter.order_id {
        query = query.filter(crate::entities::OrderColumn::Id.eq(order_id));
    }

    let orders = query.all(db).await?;
    let mut result = Vec::with_capacity(orders.len());
    for order_row in orders {
        let items = OrderItem::find()
            .filter(OrderItemColumn::OrderId.eq(order_row.id))
            .all(db)
            .await?;
        result.push(OrderWithItems {
            order: order_row,
            items,
        });
    }
    Ok(result)
}

/// Stores a new status for an order and stamps `status_update`.
///
/// When the status actually changed to one the customer cares about
/// (confirmed, shipped, delivered) a notification is enqueued; enqueueing is
/// fire-and-forget and never affects the stored mutation. Passing None for
/// `notify` skips notifications entirely.
///
/// # Errors
/// [`Error::OrderNotFound`] for an unknown order.
pub async fn update_order_status(
    db: &DatabaseConnection,
    notify: Option<&NotificationService>,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<OrderModel> {
    let existing = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    // Legacy rows may hold junk; treat unparseable as "changed"
    let changed = existing.status().ok() != Some(new_status);
    let telegram_id = existing.telegram_id;

    let mut active: order::ActiveModel = existing.into();
    active.status = Set(new_status.as_str().to_string());
    active.status_update = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!(order_id, status = %new_status, changed, "Order status stored");

    if changed && new_status.notifies_customer() {
        if let Some(service) = notify {
            if let Some(kind) = NotificationKind::for_status_change(new_status, order_id) {
                service.enqueue(Notification { telegram_id, kind });
            }
        }
    }

    Ok(updated)
}

/// Restores stock for one order item, best effort. Returns whether stock
/// actually came back.
async fn restock_item<C: ConnectionTrait>(
    conn: &C,
    item: &OrderItemModel,
    reason: &str,
) -> Result<bool> {
    let (Some(color), Some(size)) = (&item.color, &item.size) else {
        return Ok(false);
    };
    let Some(variant) = inventory::find_variant(conn, item.product_id, color, size).await? else {
        warn!(
            order_item = item.id,
            product_id = item.product_id,
            color,
            size,
            "Variant gone, cannot restore stock"
        );
        return Ok(false);
    };
    inventory::set_quantity(
        conn,
        item.product_id,
        color,
        size,
        variant.quantity + item.quantity,
        ChangeType::Restock,
        reason,
    )
    .await?;
    Ok(true)
}

/// Cancels an order and restores its stock.
///
/// Restocking is best effort: a line whose variant has since been deleted is
/// logged and skipped, the rest still come back. Cancelling an already
/// cancelled order is a no-op so stock can never be restored twice. Returns
/// the number of lines whose stock was restored.
///
/// # Errors
/// [`Error::OrderNotFound`] for an unknown order.
pub async fn cancel_order(db: &DatabaseConnection, order_id: i64) -> Result<u32> {
    let txn = db.begin().await?;
    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if existing.status().ok() == Some(OrderStatus::Cancelled) {
        return Ok(0);
    }

    let items = OrderItem::find()
        .filter(OrderItemColumn::OrderId.eq(order_id))
        .all(&txn)
        .await?;

    let reason = format!("Order #{order_id} cancellation");
    let mut restored = 0u32;
    for item in &items {
        if restock_item(&txn, item, &reason).await? {
            restored += 1;
        }
    }

    let mut active: order::ActiveModel = existing.into();
    active.status = Set(OrderStatus::Cancelled.as_str().to_string());
    active.status_update = Set(chrono::Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;
    info!(order_id, restored, "Order cancelled");
    Ok(restored)
}

/// Deletes an order after the status gate, restoring its stock.
///
/// Pending, confirmed, and shipped orders (and their legacy synonyms) may be
/// deleted; delivered orders are fulfilled financial records and are
/// rejected, as are cancelled and unrecognized-status orders. A degenerate
/// order with no items still deletes, with zero lines restored. Restoration,
/// item removal, and order removal commit together.
///
/// # Errors
/// [`Error::OrderNotFound`] for an unknown order.
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<DeleteOutcome> {
    let txn = db.begin().await?;
    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let stored_status = existing.status.clone();
    let deletable = match existing.status() {
        Ok(status) => status.is_deletable(),
        Err(_) => false,
    };
    if !deletable {
        let reason = match existing.status() {
            Ok(OrderStatus::Delivered) => {
                "delivered orders are financial records and cannot be deleted".to_string()
            }
            _ => format!("orders with status '{stored_status}' cannot be deleted"),
        };
        return Ok(DeleteOutcome::Rejected {
            status: stored_status,
            reason,
        });
    }

    let items = OrderItem::find()
        .filter(OrderItemColumn::OrderId.eq(order_id))
        .all(&txn)
        .await?;

    let reason = format!("Order #{order_id} deletion");
    let mut restored = 0u32;
    for item in &items {
        if restock_item(&txn, item, &reason).await? {
            restored += 1;
        }
    }

    OrderItem::delete_many()
        .filter(OrderItemColumn::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    info!(order_id, restored, "Order deleted");
    Ok(DeleteOutcome::Deleted {
        restored_items: restored,
    })
}
