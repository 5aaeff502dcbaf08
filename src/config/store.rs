//! Store settings loading from config.toml
//!
//! Company details, currency, stock thresholds, shipping rules, and the
//! state/region list offered during checkout all live in one TOML file so
//! deployments can be reconfigured without a rebuild.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Company / storefront display name
    pub company_name: String,
    /// Currency prefix used when formatting amounts (e.g. `"SYP "`)
    pub currency: String,
    /// Variants at or below this quantity count as low stock
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i32,
    /// Variants at or below this quantity count as critically low
    #[serde(default = "default_critical_stock")]
    pub critical_stock_threshold: i32,
    /// Flat shipping cost applied to orders
    #[serde(default)]
    pub shipping_cost: f64,
    /// Order total above which shipping is free
    #[serde(default)]
    pub free_shipping_threshold: f64,
    /// Shippable states with their regions, in display order
    #[serde(default)]
    pub states: Vec<StateConfig>,
}

/// One shippable state/governorate and its regions
#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    /// State name as shown to the customer
    pub name: String,
    /// Regions within the state, in display order
    pub regions: Vec<String>,
}

const fn default_low_stock() -> i32 {
    5
}

const fn default_critical_stock() -> i32 {
    2
}

impl StoreConfig {
    /// Looks up the region list for a state, or None if the state is not
    /// shippable.
    #[must_use]
    pub fn regions_for(&self, state: &str) -> Option<&[String]> {
        self.states
            .iter()
            .find(|s| s.name == state)
            .map(|s| s.regions.as_slice())
    }

    /// Shipping cost for a given order total, applying the free-shipping
    /// threshold when configured.
    #[must_use]
    pub fn shipping_for(&self, order_total: f64) -> f64 {
        if self.free_shipping_threshold > 0.0 && order_total >= self.free_shipping_threshold {
            0.0
        } else {
            self.shipping_cost
        }
    }
}

/// Loads store configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    Ok(toml::from_str(&contents)?)
}

/// Loads store configuration from the default location (./config.toml)
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<StoreConfig> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn sample_config() -> StoreConfig {
        let toml_str = r#"
            company_name = "Test Fashion"
            currency = "SYP "
            low_stock_threshold = 5
            critical_stock_threshold = 2
            shipping_cost = 5.0
            free_shipping_threshold = 50.0

            [[states]]
            name = "Damascus"
            regions = ["City Center", "Mazzeh", "Midan"]

            [[states]]
            name = "Rif Dimashq"
            regions = ["Douma", "Harasta"]
        "#;
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_parse_store_config() {
        let config = sample_config();
        assert_eq!(config.company_name, "Test Fashion");
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.states.len(), 2);
        assert_eq!(config.states[0].regions.len(), 3);
    }

    #[test]
    fn test_threshold_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            company_name = "Minimal"
            currency = "$"
        "#,
        )
        .unwrap();
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.critical_stock_threshold, 2);
        assert_eq!(config.shipping_cost, 0.0);
        assert!(config.states.is_empty());
    }

    #[test]
    fn test_regions_lookup() {
        let config = sample_config();
        assert_eq!(config.regions_for("Damascus").unwrap().len(), 3);
        assert!(config.regions_for("Atlantis").is_none());
    }

    #[test]
    fn test_shipping_threshold() {
        let config = sample_config();
        assert_eq!(config.shipping_for(20.0), 5.0);
        assert_eq!(config.shipping_for(50.0), 0.0);
        assert_eq!(config.shipping_for(80.0), 0.0);
    }
}
