//! Bootstrap binary: initializes logging, configuration, and the database,
//! then reports the store's state. Adapters (bot, dashboard) link against the
//! library and run their own processes.

use store_ops::config::{database, store};
use store_ops::errors::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal; env vars can be set externally
    dotenvy::dotenv().ok();

    match store::load_default_config() {
        Ok(config) => info!(company = %config.company_name, "Loaded store configuration"),
        Err(e) => warn!("No usable config.toml, continuing with defaults: {e}"),
    }

    let db = database::create_connection().await?;
    info!(url = %database::get_database_url(), "Connected to database");

    database::create_tables(&db).await?;
    database::update_schema(&db).await?;
    database::seed_defaults(&db).await?;
    info!("Database ready");

    let analytics = store_ops::core::report::inventory_analytics(&db).await?;
    info!(
        products = analytics.total_products,
        variants = analytics.total_variants,
        units = analytics.total_units,
        low_stock = analytics.low_stock_variants,
        "Inventory snapshot"
    );

    Ok(())
}
