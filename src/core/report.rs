//! Reporting - inventory analytics and sales summaries for the dashboard.
//!
//! Read-only aggregation over the store. Cancelled orders never count toward
//! revenue; the delivered views exist for accounting and accept the legacy
//! status synonyms still present in migrated rows.

use crate::entities::{
    Category, CategoryColumn, Order, OrderColumn, OrderItem, OrderItemColumn, OrderModel,
    OrderStatus, Product, ProductColumn, Variant,
};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

/// Status strings that mean "delivered" in stored rows, canonical plus the
/// legacy synonyms.
const DELIVERED_SYNONYMS: &[&str] = &["delivered", "completed", "تم التوصيل", "مكتمل"];

const CANCELLED_SYNONYMS: &[&str] = &["cancelled", "canceled", "ملغي"];

/// Stock held by one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryStock {
    pub category_name: String,
    pub products: u64,
    pub units: i64,
}

/// Snapshot of the whole inventory.
#[derive(Clone, Debug, Default)]
pub struct InventoryAnalytics {
    pub total_products: u64,
    pub total_variants: u64,
    pub total_units: i64,
    pub out_of_stock_variants: u64,
    /// In stock but at or below the variant's alert threshold
    pub low_stock_variants: u64,
    pub by_category: Vec<CategoryStock>,
}

/// Inventory totals and per-category breakdown over active products.
pub async fn inventory_analytics(db: &DatabaseConnection) -> Result<InventoryAnalytics> {
    let categories = Category::find()
        .order_by_asc(CategoryColumn::Name)
        .all(db)
        .await?;
    let products = Product::find()
        .filter(ProductColumn::IsActive.eq(true))
        .all(db)
        .await?;
    let variants = Variant::find().all(db).await?;

    let product_category: HashMap<i64, i64> =
        products.iter().map(|p| (p.id, p.category_id)).collect();

    let mut analytics = InventoryAnalytics {
        total_products: products.len() as u64,
        ..Default::default()
    };
    let mut category_products: HashMap<i64, u64> = HashMap::new();
    let mut category_units: HashMap<i64, i64> = HashMap::new();
    for p in &products {
        *category_products.entry(p.category_id).or_default() += 1;
    }

    for v in &variants {
        let Some(&category_id) = product_category.get(&v.product_id) else {
            // Variant of an inactive or deleted product
            continue;
        };
        analytics.total_variants += 1;
        analytics.total_units += i64::from(v.quantity);
        if v.quantity == 0 {
            analytics.out_of_stock_variants += 1;
        } else if v.quantity <= v.min_stock_alert {
            analytics.low_stock_variants += 1;
        }
        *category_units.entry(category_id).or_default() += i64::from(v.quantity);
    }

    for c in categories {
        let products = category_products.get(&c.id).copied().unwrap_or(0);
        if products == 0 {
            continue;
        }
        analytics.by_category.push(CategoryStock {
            category_name: c.name,
            products,
            units: category_units.get(&c.id).copied().unwrap_or(0),
        });
    }
    Ok(analytics)
}

/// Sales aggregates over a trailing window.
#[derive(Clone, Debug, Default)]
pub struct SalesSummary {
    pub orders: u64,
    pub revenue: f64,
    pub average_order_value: f64,
    /// (product name, units sold), best first
    pub top_sellers: Vec<(String, i64)>,
}

/// Order count, revenue, and top sellers over the trailing `days` days.
/// Cancelled orders are excluded.
pub async fn sales_summary(db: &DatabaseConnection, days: i64) -> Result<SalesSummary> {
    let cutoff = Utc::now() - chrono::Duration::days(days);
    let orders = Order::find()
        .filter(OrderColumn::OrderDate.gte(cutoff))
        .filter(OrderColumn::Status.is_not_in(CANCELLED_SYNONYMS.iter().copied()))
        .all(db)
        .await?;

    let mut summary = SalesSummary {
        orders: orders.len() as u64,
        ..Default::default()
    };
    let mut units_by_product: HashMap<String, i64> = HashMap::new();
    for order in &orders {
        summary.revenue += order.total_amount;
        let items = OrderItem::find()
            .filter(OrderItemColumn::OrderId.eq(order.id))
            .all(db)
            .await?;
        for item in items {
            *units_by_product.entry(item.product_name).or_default() +=
                i64::from(item.quantity);
        }
    }
    if summary.orders > 0 {
        summary.average_order_value = summary.revenue / summary.orders as f64;
    }

    let mut top: Vec<_> = units_by_product.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary.top_sellers = top;
    Ok(summary)
}

/// Delivered orders with `status_update` in `[start, end)`, oldest first.
/// Matches the legacy synonyms so migrated rows are not lost from accounting.
pub async fn delivered_orders(
    db: &DatabaseConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<OrderModel>> {
    Order::find()
        .filter(OrderColumn::Status.is_in(DELIVERED_SYNONYMS.iter().copied()))
        .filter(OrderColumn::StatusUpdate.gte(start))
        .filter(OrderColumn::StatusUpdate.lt(end))
        .order_by_asc(OrderColumn::StatusUpdate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Revenue from delivered orders with `status_update` in `[start, end)`.
pub async fn delivered_revenue(
    db: &DatabaseConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<f64> {
    Ok(delivered_orders(db, start, end)
        .await?
        .iter()
        .map(|o| o.total_amount)
        .sum())
}

/// One customer's order history in aggregate.
#[derive(Clone, Debug, Default)]
pub struct CustomerSummary {
    pub orders: u64,
    pub cancelled: u64,
    /// Spend across non-cancelled orders
    pub total_spent: f64,
    pub last_order: Option<DateTime<Utc>>,
}

/// Aggregates a customer's orders by Telegram id.
pub async fn customer_orders_summary(
    db: &DatabaseConnection,
    telegram_id: i64,
) -> Result<CustomerSummary> {
    let orders = Order::find()
        .filter(OrderColumn::TelegramId.eq(telegram_id))
        .all(db)
        .await?;

    let mut summary = CustomerSummary::default();
    for order in orders {
        summary.orders += 1;
        let cancelled = order.status().ok() == Some(OrderStatus::Cancelled);
        if cancelled {
            summary.cancelled += 1;
        } else {
            summary.total_spent += order.total_amount;
        }
        summary.last_order = Some(match summary.last_order {
            Some(latest) if latest > order.order_date => latest,
            _ => order.order_date,
        });
    }
    Ok(summary)
}

/// Lifetime sales of one product.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductSales {
    pub units_sold: i64,
    pub revenue: f64,
}

/// Units and revenue for a product across all non-cancelled orders, priced at
/// the snapshots taken when each order was placed.
pub async fn product_sales(db: &DatabaseConnection, product_id: i64) -> Result<ProductSales> {
    let items = OrderItem::find()
        .filter(OrderItemColumn::ProductId.eq(product_id))
        .all(db)
        .await?;

    let mut sales = ProductSales::default();
    for item in items {
        let Some(order) = Order::find_by_id(item.order_id).one(db).await? else {
            continue;
        };
        if order.status().ok() == Some(OrderStatus::Cancelled) {
            continue;
        }
        sales.units_sold += i64::from(item.quantity);
        sales.revenue += item.price * f64::from(item.quantity);
    }
    Ok(sales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::order::{
        cancel_order, create_order, update_order_status, NewOrderItem, OrderOutcome,
    };
    use crate::core::catalog::update_product_price;
    use crate::entities::OrderStatus;
    use crate::test_utils::{
        create_test_product, create_test_variant, setup_test_db, test_customer,
    };

    async fn place_one(
        db: &DatabaseConnection,
        product_id: i64,
        qty: i32,
        total: f64,
    ) -> Result<i64> {
        let items = [NewOrderItem {
            product_id,
            quantity: qty,
            color: Some("Red".to_string()),
            size: Some("M".to_string()),
            unit_price: None,
            display_name: None,
        }];
        match create_order(db, &test_customer(), &items, total, None).await? {
            OrderOutcome::Placed { order_id } => Ok(order_id),
            OrderOutcome::Rejected { .. } => panic!("expected placement"),
        }
    }

    #[tokio::test]
    async fn test_inventory_analytics_thresholds() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 10).await?;
        create_test_variant(&db, shirt.id, "Blue", "L", 0).await?;
        create_test_variant(&db, shirt.id, "Green", "S", 2).await?; // at alert level 5

        let analytics = inventory_analytics(&db).await?;
        assert_eq!(analytics.total_products, 1);
        assert_eq!(analytics.total_variants, 3);
        assert_eq!(analytics.total_units, 12);
        assert_eq!(analytics.out_of_stock_variants, 1);
        assert_eq!(analytics.low_stock_variants, 1);
        assert_eq!(analytics.by_category.len(), 1);
        assert_eq!(analytics.by_category[0].category_name, "Clothing");
        Ok(())
    }

    #[tokio::test]
    async fn test_sales_summary_excludes_cancelled() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 20).await?;

        place_one(&db, shirt.id, 2, 50.0).await?;
        let cancelled = place_one(&db, shirt.id, 1, 25.0).await?;
        cancel_order(&db, cancelled).await?;

        let summary = sales_summary(&db, 7).await?;
        assert_eq!(summary.orders, 1);
        assert!((summary.revenue - 50.0).abs() < f64::EPSILON);
        assert!((summary.average_order_value - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.top_sellers, vec![("Shirt".to_string(), 2)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delivered_views_accept_legacy_synonyms() -> Result<()> {
        use sea_orm::{ActiveModelTrait, ActiveValue::Set};

        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 20).await?;

        let delivered = place_one(&db, shirt.id, 1, 25.0).await?;
        update_order_status(&db, None, delivered, OrderStatus::Delivered).await?;

        // Legacy migrated row
        let legacy = place_one(&db, shirt.id, 1, 30.0).await?;
        let row = Order::find_by_id(legacy).one(&db).await?.unwrap();
        let mut active: crate::entities::order::ActiveModel = row.into();
        active.status = Set("مكتمل".to_string());
        active.update(&db).await?;

        // Still pending, must not appear
        place_one(&db, shirt.id, 1, 40.0).await?;

        let start = Utc::now() - chrono::Duration::days(1);
        let end = Utc::now() + chrono::Duration::days(1);
        assert_eq!(delivered_orders(&db, start, end).await?.len(), 2);
        assert!((delivered_revenue(&db, start, end).await? - 55.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_customer_summary() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 20).await?;

        place_one(&db, shirt.id, 1, 25.0).await?;
        let cancelled = place_one(&db, shirt.id, 2, 50.0).await?;
        cancel_order(&db, cancelled).await?;

        let summary = customer_orders_summary(&db, test_customer().telegram_id).await?;
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.cancelled, 1);
        assert!((summary.total_spent - 25.0).abs() < f64::EPSILON);
        assert!(summary.last_order.is_some());

        let nobody = customer_orders_summary(&db, 12345).await?;
        assert_eq!(nobody.orders, 0);
        assert!(nobody.last_order.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_product_sales_use_price_snapshots() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 20).await?;

        place_one(&db, shirt.id, 2, 50.0).await?;
        // Raising the price later must not change recorded sales
        update_product_price(&db, shirt.id, 40.0).await?;
        place_one(&db, shirt.id, 1, 40.0).await?;

        let sales = product_sales(&db, shirt.id).await?;
        assert_eq!(sales.units_sold, 3);
        assert!((sales.revenue - 90.0).abs() < f64::EPSILON);
        Ok(())
    }
}
