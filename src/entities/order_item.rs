//! Order item entity - One line of an order.
//!
//! Price, name and image are snapshots taken at submission time; they are
//! decoupled from later product edits.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Externally visible unique reference
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_item_reference: String,
    /// Owning order
    #[sea_orm(indexed)]
    pub order_reference: String,
    /// 0-based position of the line in the submitted order
    pub line_number: i32,
    /// Product this line was ordered from
    pub product_id: i64,
    /// Unit price used for this line
    pub price_snapshot: i64,
    /// Units ordered, always positive
    pub quantity: i64,
    /// `price_snapshot * quantity`
    pub total: i64,
    /// Product name at submission time
    pub product_name_snapshot: String,
    /// Product image at submission time
    pub product_image_url_snapshot: String,
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

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderReference",
        to = "super::order::Column::OrderReference"
    )]
    Order,
    /// Each item references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
