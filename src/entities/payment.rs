//! Payment entity - The single payment attached to an order.
//!
//! Created `PENDING` together with its order. Card fields stay empty until a
//! payment outcome is applied, and are stored masked.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Awaiting the outcome
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Funds captured
    #[sea_orm(string_value = "RECEIVED")]
    Received,
    /// Order cancelled before payment
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Order cancelled after payment
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Externally visible unique reference
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_reference: String,
    /// The order this payment settles (1:1)
    #[sea_orm(unique)]
    pub order_reference: String,
    /// Mirrors the order total
    pub total: i64,
    /// Masked holder name, empty until confirmed
    pub card_holder_name: String,
    /// Masked card number, empty until confirmed
    pub card_number: String,
    /// Current state
    pub status: PaymentStatus,
    /// When the payment row was opened
    pub payment_date: DateTimeUtc,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
    /// Who created the row
    pub created_by: String,
    /// Who last modified the row
    pub updated_by: String,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderReference",
        to = "super::order::Column::OrderReference"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
