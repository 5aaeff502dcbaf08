/// Database connection, schema creation/upgrade, and seeding
pub mod database;

/// Store settings loaded from config.toml (company, currency, thresholds, regions)
pub mod store;
