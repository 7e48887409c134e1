//! Seed catalog loading from config.toml
//!
//! Products listed in `config.toml` are inserted on startup when no product with
//! the same name exists yet, so a fresh database has something to sell.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single seeded product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Product name, used to detect already-seeded rows
    pub name: String,
    /// Catalog category
    #[serde(default)]
    pub category_id: i64,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Unit price in minor currency units
    pub price: i64,
    /// Initial stock
    pub stock: i64,
    /// Image location
    #[serde(default)]
    pub image_url: String,
    /// Whether the product can be ordered
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load catalog from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads the seed catalog from `CATALOG_CONFIG`, or `./config.toml` when unset.
pub fn load_default_catalog() -> Result<CatalogConfig> {
    let path = std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_catalog(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[products]]
            name = "Ceramic Planter"
            category_id = 2
            price = 125000
            stock = 40
            image_url = "https://cdn.example.com/planter.png"

            [[products]]
            name = "Watering Can"
            price = 89000
            stock = 0
            is_active = false
        "#;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[0].name, "Ceramic Planter");
        assert_eq!(config.products[0].price, 125_000);
        assert!(config.products[0].is_active);

        assert_eq!(config.products[1].category_id, 0);
        assert!(config.products[1].description.is_empty());
        assert!(!config.products[1].is_active);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let result = load_catalog("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
