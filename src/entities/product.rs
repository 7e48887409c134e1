//! Product entity - Represents a catalog item with live stock.
//!
//! Stock is only mutated by order submission (decrement) and cancellation
//! (increment). Products are soft-deleted via `deleted_at`, never removed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Catalog category
    pub category_id: i64,
    /// Display name (e.g., "Ceramic Planter")
    pub name: String,
    /// Long description
    pub description: String,
    /// Units available, never negative
    pub stock: i64,
    /// Unit price in minor currency units
    pub price: i64,
    /// Product image location
    pub image_url: String,
    /// Inactive products cannot be ordered
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
    /// Who created the row
    pub created_by: String,
    /// Who last modified the row
    pub updated_by: String,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product appears in many order items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
