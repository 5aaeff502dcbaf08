//! Catalog store - categories, products, and variant management.
//!
//! Writes validate their inputs here (positive prices, non-negative starting
//! stock); reads offer both raw listings for staff and availability-filtered
//! views for the storefront, where empty products and categories disappear.

use crate::core::inventory;
use crate::entities::{
    category, product, variant, Category, CategoryColumn, CategoryModel, ChangeType, ColorOption,
    ColorOptionColumn, ColorOptionModel, Product, ProductColumn, ProductModel, SizeOption,
    SizeOptionColumn, SizeOptionModel, Variant, VariantColumn, VariantModel,
};
use crate::errors::{Error, Result};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

/// A product together with its (filtered) variants.
#[derive(Clone, Debug)]
pub struct CatalogProduct {
    pub product: ProductModel,
    pub variants: Vec<VariantModel>,
}

/// A category together with its (filtered) products.
#[derive(Clone, Debug)]
pub struct CatalogCategory {
    pub category: CategoryModel,
    pub products: Vec<CatalogProduct>,
}

/// Optional field updates for a product. Unset fields keep their value.
#[derive(Clone, Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub model_number: Option<String>,
}

/// Gets or creates a category by name.
pub async fn ensure_category<C: ConnectionTrait>(conn: &C, name: &str) -> Result<CategoryModel> {
    if let Some(existing) = Category::find()
        .filter(CategoryColumn::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let created = category::ActiveModel {
        name: Set(name.to_string()),
        display_name: Set(name.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!(category = name, "Created category");
    Ok(created)
}

/// Creates a product under the named category, creating the category when
/// needed.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for a non-positive price.
pub async fn add_product(
    db: &DatabaseConnection,
    category_name: &str,
    name: &str,
    price: f64,
    description: Option<&str>,
    model_number: Option<&str>,
) -> Result<ProductModel> {
    if price <= 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }

    let txn = db.begin().await?;
    let category = ensure_category(&txn, category_name).await?;
    let now = chrono::Utc::now();
    let created = product::ActiveModel {
        category_id: Set(category.id),
        name: Set(name.to_string()),
        price: Set(price),
        description: Set(description.unwrap_or_default().to_string()),
        model_number: Set(model_number.map(ToString::to_string)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(product_id = created.id, name, price, "Added product");
    Ok(created)
}

/// Creates a variant, or updates stock and image on the existing one for the
/// same (product, color, size).
///
/// The stock change on an existing variant goes through the inventory ledger
/// as an adjustment so the history chain stays complete; only initial
/// creation starts without an entry.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] for an unknown product and
/// [`Error::InvalidQuantity`] for negative stock.
pub async fn upsert_variant(
    db: &DatabaseConnection,
    product_id: i64,
    color: &str,
    size: &str,
    quantity: i32,
    image_path: Option<&str>,
) -> Result<VariantModel> {
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let txn = db.begin().await?;
    Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let existing = inventory::find_variant(&txn, product_id, color, size).await?;
    let result = match existing {
        Some(current) => {
            let mut updated = if current.quantity == quantity {
                current
            } else {
                inventory::set_quantity(
                    &txn,
                    product_id,
                    color,
                    size,
                    quantity,
                    ChangeType::Adjustment,
                    "variant updated",
                )
                .await?
            };
            if let Some(path) = image_path {
                let mut active: variant::ActiveModel = updated.into();
                active.image_path = Set(Some(path.to_string()));
                active.updated_at = Set(chrono::Utc::now());
                updated = active.update(&txn).await?;
            }
            updated
        }
        None => {
            let now = chrono::Utc::now();
            variant::ActiveModel {
                product_id: Set(product_id),
                color: Set(color.to_string()),
                size: Set(size.to_string()),
                quantity: Set(quantity),
                min_stock_alert: Set(5),
                image_path: Set(image_path.map(ToString::to_string)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;
    Ok(result)
}

/// Applies the set fields of `update` to a product.
///
/// Price and name snapshots on existing order items are untouched by
/// construction: items copy those values at order time.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: ProductUpdate,
) -> Result<ProductModel> {
    if let Some(price) = update.price {
        if price <= 0.0 {
            return Err(Error::InvalidAmount { amount: price });
        }
    }

    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active.name = Set(name);
    }
    if let Some(price) = update.price {
        active.price = Set(price);
    }
    if let Some(description) = update.description {
        active.description = Set(description);
    }
    if let Some(model_number) = update.model_number {
        active.model_number = Set(Some(model_number));
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Changes a product's price.
pub async fn update_product_price(
    db: &DatabaseConnection,
    product_id: i64,
    price: f64,
) -> Result<ProductModel> {
    update_product(
        db,
        product_id,
        ProductUpdate {
            price: Some(price),
            ..Default::default()
        },
    )
    .await
}

/// Soft-hides a product from the storefront without touching stock or orders.
pub async fn deactivate_product(db: &DatabaseConnection, product_id: i64) -> Result<ProductModel> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let mut active: product::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    info!(product_id, "Deactivated product");
    Ok(updated)
}

/// Hard-deletes a product and its variants.
///
/// Order items keep their snapshots and the inventory ledger keeps its
/// entries; only the catalog rows disappear.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    Variant::delete_many()
        .filter(VariantColumn::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(product_id, "Deleted product");
    Ok(())
}

/// Hard-deletes a single variant. Its ledger entries remain.
pub async fn delete_variant(db: &DatabaseConnection, variant_id: i64) -> Result<()> {
    let existing = Variant::find_by_id(variant_id).one(db).await?;
    match existing {
        Some(v) => {
            let product_id = v.product_id;
            v.delete(db).await?;
            info!(variant_id, product_id, "Deleted variant");
            Ok(())
        }
        None => Err(Error::VariantNotFound {
            product_id: 0,
            color: String::new(),
            size: String::new(),
        }),
    }
}

/// Storefront view: categories with their active products and in-stock
/// variants only. Products with nothing in stock and categories with no such
/// products are omitted entirely.
pub async fn get_available_catalog(db: &DatabaseConnection) -> Result<Vec<CatalogCategory>> {
    let categories = Category::find()
        .order_by_asc(CategoryColumn::Name)
        .all(db)
        .await?;

    let mut result = Vec::new();
    for cat in categories {
        let products = Product::find()
            .filter(ProductColumn::CategoryId.eq(cat.id))
            .filter(ProductColumn::IsActive.eq(true))
            .order_by_asc(ProductColumn::Name)
            .all(db)
            .await?;

        let mut in_stock = Vec::new();
        for p in products {
            let variants = inventory::list_available_variants(db, p.id).await?;
            if !variants.is_empty() {
                in_stock.push(CatalogProduct {
                    product: p,
                    variants,
                });
            }
        }
        if !in_stock.is_empty() {
            result.push(CatalogCategory {
                category: cat,
                products: in_stock,
            });
        }
    }
    Ok(result)
}

/// Single product with its in-stock variants, or None when the product is
/// missing, inactive, or fully out of stock.
pub async fn get_product_with_variants(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<CatalogProduct>> {
    let Some(product) = Product::find_by_id(product_id)
        .filter(ProductColumn::IsActive.eq(true))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let variants = inventory::list_available_variants(db, product_id).await?;
    if variants.is_empty() {
        return Ok(None);
    }
    Ok(Some(CatalogProduct { product, variants }))
}

/// Predefined size options in display order.
pub async fn size_options(db: &DatabaseConnection) -> Result<Vec<SizeOptionModel>> {
    SizeOption::find()
        .order_by_asc(SizeOptionColumn::DisplayOrder)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Predefined color options in display order.
pub async fn color_options(db: &DatabaseConnection) -> Result<Vec<ColorOptionModel>> {
    ColorOption::find()
        .order_by_asc(ColorOptionColumn::DisplayOrder)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_product, create_test_variant, setup_test_db};

    #[tokio::test]
    async fn test_ensure_category_is_get_or_create() -> Result<()> {
        let db = setup_test_db().await?;
        let first = ensure_category(&db, "Shoes").await?;
        let second = ensure_category(&db, "Shoes").await?;
        assert_eq!(first.id, second.id);
        assert_eq!(Category::find().all(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_rejects_non_positive_price() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_product(&db, "Clothing", "Freebie", 0.0, None, None).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_variant_creates_then_adjusts() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Shirt", 25.0).await?;

        let created = upsert_variant(&db, product.id, "Red", "M", 10, None).await?;
        assert_eq!(created.quantity, 10);

        let updated = upsert_variant(&db, product.id, "Red", "M", 4, None).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.quantity, 4);

        // The stock change went through the ledger
        let history = inventory::history_for_variant(&db, created.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change_amount, -6);
        assert_eq!(history[0].change_type, "adjustment");
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_variant_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;
        let result = upsert_variant(&db, 999, "Red", "M", 1, None).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_price() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Shirt", 25.0).await?;

        let updated = update_product_price(&db, product.id, 30.0).await?;
        assert!((updated.price - 30.0).abs() < f64::EPSILON);

        let result = update_product_price(&db, product.id, -1.0).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_available_catalog_filters_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 5).await?;
        let sold_out = create_test_product(&db, "Socks", 5.0).await?;
        create_test_variant(&db, sold_out.id, "White", "M", 0).await?;
        // Product with no variants at all
        create_test_product(&db, "Hat", 10.0).await?;

        let catalog = get_available_catalog(&db).await?;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].products.len(), 1);
        assert_eq!(catalog[0].products[0].product.name, "Shirt");
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_product_hidden() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        create_test_variant(&db, shirt.id, "Red", "M", 5).await?;

        deactivate_product(&db, shirt.id).await?;
        assert!(get_available_catalog(&db).await?.is_empty());
        assert!(get_product_with_variants(&db, shirt.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_keeps_ledger() -> Result<()> {
        let db = setup_test_db().await?;
        let shirt = create_test_product(&db, "Shirt", 25.0).await?;
        let variant = create_test_variant(&db, shirt.id, "Red", "M", 5).await?;
        inventory::adjust_stock(&db, shirt.id, "Red", "M", 3, "stocktake").await?;

        delete_product(&db, shirt.id).await?;
        assert!(Product::find_by_id(shirt.id).one(&db).await?.is_none());
        assert!(Variant::find_by_id(variant.id).one(&db).await?.is_none());
        assert_eq!(inventory::history_for_variant(&db, variant.id).await?.len(), 1);
        Ok(())
    }
}
