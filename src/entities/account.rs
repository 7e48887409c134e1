//! Account entity - Represents a registered customer.
//!
//! The username is the identity key other tables reference. Accounts are never
//! hard-deleted; `is_active` gates ordering and login.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Internal numeric key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login name, referenced by orders
    #[sea_orm(unique)]
    pub username: String,
    /// Name shown to other users
    pub display_name: String,
    /// Unique contact address
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string of the login password
    #[serde(skip_serializing)]
    pub login_password: String,
    /// Default delivery address
    pub registered_address: String,
    /// Inactive accounts may neither log in nor order
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
    /// Who created the row
    pub created_by: String,
    /// Who last modified the row
    pub updated_by: String,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account places many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
