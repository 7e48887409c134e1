//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::catalog::ProductConfig,
    core::{auth::hash_password, order::OrderLineRequest, product},
    entities::{self, account},
    errors::Result,
    repository::AccountRepository,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};

/// Password that satisfies the policy, used for hashed test accounts.
pub const TEST_PASSWORD: &str = "Garden#2024";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

async fn insert_account(
    db: &DatabaseConnection,
    username: &str,
    login_password: String,
    is_active: bool,
) -> Result<entities::account::Model> {
    let now = Utc::now();
    AccountRepository::new(db)
        .create(account::ActiveModel {
            username: Set(username.to_string()),
            display_name: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            login_password: Set(login_password),
            registered_address: Set("12 Garden Lane".to_string()),
            is_active: Set(is_active),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(username.to_string()),
            updated_by: Set(username.to_string()),
            deleted_at: Set(None),
            ..Default::default()
        })
        .await
}

/// Creates an active account.
///
/// # Defaults
/// * `email`: `"{username}@example.com"`
/// * `login_password`: not a valid hash, so the account cannot log in
pub async fn create_test_account(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::account::Model> {
    insert_account(db, username, "unusable".to_string(), true).await
}

/// Creates an inactive account whose password is [`TEST_PASSWORD`].
pub async fn create_inactive_account(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::account::Model> {
    insert_account(db, username, hash_password(TEST_PASSWORD)?, false).await
}

/// Catalog entry with the given name, price and stock.
pub fn product_config(name: &str, price: i64, stock: i64) -> ProductConfig {
    ProductConfig {
        name: name.to_string(),
        category_id: 1,
        description: format!("{name} for testing"),
        price,
        stock,
        image_url: format!("https://cdn.example.com/{}.png", name.to_lowercase()),
        is_active: true,
    }
}

/// Creates an active test product.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    stock: i64,
) -> Result<entities::product::Model> {
    product::create_product(db, &product_config(name, price, stock)).await
}

/// Creates a test product with custom activity.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    stock: i64,
    is_active: bool,
) -> Result<entities::product::Model> {
    let mut config = product_config(name, price, stock);
    config.is_active = is_active;
    product::create_product(db, &config).await
}

/// Order line for `quantity` units of `product` at its current price.
pub fn line_for(product: &entities::product::Model, quantity: i64) -> OrderLineRequest {
    OrderLineRequest {
        product_id: product.id,
        price_used: product.price,
        quantity,
        product_name: product.name.clone(),
        product_image_url: product.image_url.clone(),
    }
}

/// Unsaved product model, for tests of pure helpers.
pub fn sample_product(id: i64, stock: i64) -> entities::product::Model {
    let now = Utc::now();
    entities::product::Model {
        id,
        category_id: 1,
        name: format!("product {id}"),
        description: String::new(),
        stock,
        price: 100,
        image_url: String::new(),
        is_active: true,
        created_at: now,
        updated_at: now,
        created_by: "SYSTEM".to_string(),
        updated_by: "SYSTEM".to_string(),
        deleted_at: None,
    }
}

/// Unsaved order item model, for tests of pure helpers.
pub fn sample_item(reference: &str, product_id: i64, quantity: i64) -> entities::order_item::Model {
    let now = Utc::now();
    entities::order_item::Model {
        order_item_reference: reference.to_string(),
        order_reference: "ORDER1".to_string(),
        line_number: 0,
        product_id,
        price_snapshot: 100,
        quantity,
        total: 100 * quantity,
        product_name_snapshot: format!("product {product_id}"),
        product_image_url_snapshot: String::new(),
        created_at: now,
        updated_at: now,
        created_by: "alice".to_string(),
        updated_by: "alice".to_string(),
        deleted_at: None,
    }
}
