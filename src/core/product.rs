//! Product business logic - catalog queries and catalog seeding.
//!
//! Stock is never changed here; only order submission and cancellation move
//! it. New products enter the catalog through [`create_product`], usually via
//! [`seed_catalog`] at startup.

use crate::{
    config::catalog::{CatalogConfig, ProductConfig},
    core::{
        order::SYSTEM_ACTOR,
        pagination::{Metadata, Pagination},
    },
    entities::product,
    errors::{Error, Result},
    repository::{ProductFilter, ProductRepository},
};
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

/// Input for [`get_products`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Optional substring of the product name
    #[serde(default)]
    pub name: String,
    /// Only list products that can be ordered
    #[serde(default)]
    pub active_only: bool,
    /// Page selection
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Public view of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// Product id
    pub id: i64,
    /// Catalog category
    pub category_id: i64,
    /// Display name
    pub name: String,
    /// Long description
    pub description: String,
    /// Units available
    pub stock: i64,
    /// Unit price in minor currency units
    pub price: i64,
    /// Image location
    pub image_url: String,
    /// Whether the product can be ordered
    pub is_active: bool,
}

impl From<product::Model> for ProductView {
    fn from(product: product::Model) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            description: product.description,
            stock: product.stock,
            price: product.price,
            image_url: product.image_url,
            is_active: product.is_active,
        }
    }
}

/// A page of products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    /// Products on this page, by id
    pub products: Vec<ProductView>,
    /// Listing metadata
    pub metadata: Metadata,
}

/// Lists catalog products.
///
/// # Errors
/// `Validation` for out-of-range pagination, `DbOperation` for store failures.
#[instrument(skip(db))]
pub async fn get_products(db: &DatabaseConnection, query: ProductQuery) -> Result<ProductList> {
    let page = query.pagination.to_page_request()?;
    let filter = ProductFilter {
        name: query.name,
        active_only: query.active_only,
    };

    let (rows, total_data) = ProductRepository::new(db)
        .find_with_filters(&filter, page)
        .await?;

    Ok(ProductList {
        products: rows.into_iter().map(ProductView::from).collect(),
        metadata: query.pagination.metadata(total_data),
    })
}

/// Loads one product.
///
/// # Errors
/// `ResourceNotFound` if no product has this id.
#[instrument(skip(db))]
pub async fn get_product_detail(db: &DatabaseConnection, product_id: i64) -> Result<ProductView> {
    ProductRepository::new(db)
        .find_by_id(product_id)
        .await
        .map(ProductView::from)
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns a `Validation` error if:
/// - The product name is empty or whitespace-only
/// - The price is not positive
/// - The stock is negative
pub async fn create_product(
    db: &DatabaseConnection,
    config: &ProductConfig,
) -> Result<product::Model> {
    if config.name.trim().is_empty() {
        error!("product name cannot be empty");
        return Err(Error::validation("product name cannot be empty"));
    }
    if config.price <= 0 {
        error!("invalid price for {}: {}", config.name, config.price);
        return Err(Error::validation(format!(
            "price must be positive: {}",
            config.price
        )));
    }
    if config.stock < 0 {
        error!("invalid stock for {}: {}", config.name, config.stock);
        return Err(Error::validation(format!(
            "stock cannot be negative: {}",
            config.stock
        )));
    }

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        category_id: Set(config.category_id),
        name: Set(config.name.trim().to_string()),
        description: Set(config.description.clone()),
        stock: Set(config.stock),
        price: Set(config.price),
        image_url: Set(config.image_url.clone()),
        is_active: Set(config.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(SYSTEM_ACTOR.to_string()),
        updated_by: Set(SYSTEM_ACTOR.to_string()),
        deleted_at: Set(None),
        ..Default::default()
    };
    ProductRepository::new(db).create(product).await
}

/// Inserts every catalog product whose name is not in the store yet.
///
/// Returns the number of products created.
///
/// # Errors
/// Fails on the first invalid product or store error.
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<usize> {
    let products = ProductRepository::new(db);
    let mut created = 0;

    for config in &catalog.products {
        if products.exists_by_name(config.name.trim()).await? {
            tracing::debug!("Product already seeded: {}", config.name);
            continue;
        }
        create_product(db, config).await?;
        info!("Seeded product: {}", config.name);
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut config = product_config("   ", 100, 1);
        let result = create_product(&db, &config).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        config = product_config("Planter", 0, 1);
        let result = create_product(&db, &config).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        config = product_config("Planter", 100, -1);
        let result = create_product(&db, &config).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[test]
    fn test_product_query_wire_shape() {
        let query: ProductQuery =
            serde_json::from_str(r#"{"name":"Planter","isPaginate":true,"page":2,"perPage":10}"#)
                .unwrap();
        assert_eq!(query.name, "Planter");
        assert!(!query.active_only);
        assert_eq!(query.pagination, Pagination::page(2, 10));

        let query: ProductQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.pagination, Pagination::default());
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = create_product(&db, &product_config("  Planter ", 1_500, 12)).await?;
        assert_eq!(product.name, "Planter");
        assert_eq!(product.price, 1_500);
        assert_eq!(product.stock, 12);
        assert!(product.is_active);
        assert_eq!(product.created_by, SYSTEM_ACTOR);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_detail() -> Result<()> {
        let db = setup_test_db().await?;
        let planter = create_test_product(&db, "Planter", 1_500, 12).await?;

        let view = get_product_detail(&db, planter.id).await?;
        assert_eq!(view.name, "Planter");
        assert_eq!(view.stock, 12);

        let missing = get_product_detail(&db, 999).await;
        assert!(matches!(missing, Err(Error::ResourceNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_products_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Ceramic Planter", 1_500, 12).await?;
        create_test_product(&db, "Hanging Planter", 2_000, 3).await?;
        create_custom_product(&db, "Old Planter", 900, 0, false).await?;
        create_test_product(&db, "Potting Soil", 250, 40).await?;

        let all = get_products(&db, ProductQuery::default()).await?;
        assert_eq!(all.products.len(), 4);
        assert_eq!(all.metadata.total_data, 4);

        let planters = get_products(
            &db,
            ProductQuery {
                name: "Planter".to_string(),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(planters.products.len(), 3);

        let active_planters = get_products(
            &db,
            ProductQuery {
                name: "Planter".to_string(),
                active_only: true,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(active_planters.products.len(), 2);
        assert!(active_planters.products.iter().all(|p| p.is_active));

        let paged = get_products(
            &db,
            ProductQuery {
                pagination: Pagination::page(2, 3),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(paged.products.len(), 1);
        assert_eq!(paged.products[0].name, "Potting Soil");
        assert_eq!(paged.metadata.total_page, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = CatalogConfig {
            products: vec![
                product_config("Planter", 1_500, 12),
                product_config("Soil", 250, 40),
            ],
        };

        assert_eq!(seed_catalog(&db, &catalog).await?, 2);
        assert_eq!(seed_catalog(&db, &catalog).await?, 0);

        let all = get_products(&db, ProductQuery::default()).await?;
        assert_eq!(all.products.len(), 2);

        Ok(())
    }
}
