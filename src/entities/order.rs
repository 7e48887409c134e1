//! Order entity - One customer checkout.
//!
//! The reference is generated at submission and never changes. The total is
//! fixed at creation as the sum of item totals; later transitions only touch
//! `status` and the audit columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(200))")]
pub enum OrderStatus {
    /// Created, waiting for the payment outcome
    #[sea_orm(string_value = "PENDING PAYMENT")]
    #[serde(rename = "PENDING PAYMENT")]
    PendingPayment,
    /// Payment confirmed
    #[sea_orm(string_value = "PAYMENT RECEIVED")]
    #[serde(rename = "PAYMENT RECEIVED")]
    PaymentReceived,
    /// Handed to fulfilment; can no longer be cancelled
    #[sea_orm(string_value = "PROCESSED")]
    #[serde(rename = "PROCESSED")]
    Processed,
    /// Delivered
    #[sea_orm(string_value = "FINISHED")]
    #[serde(rename = "FINISHED")]
    Finished,
    /// Cancelled and restocked
    #[sea_orm(string_value = "CANCELLED")]
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Externally visible unique reference
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_reference: String,
    /// When the order was placed
    pub order_date: DateTimeUtc,
    /// Owner of the order
    pub account_username: String,
    /// Where the goods are shipped
    pub delivery_address: String,
    /// Current lifecycle state
    pub status: OrderStatus,
    /// Sum of item totals in minor currency units
    pub total: i64,
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

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountUsername",
        to = "super::account::Column::Username"
    )]
    Account,
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    /// One order has exactly one payment
    #[sea_orm(has_one = "super::payment::Entity")]
    Payment,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
