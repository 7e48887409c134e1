use crate::{
    entities::{OrderItem, order_item},
    errors::Result,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel};

/// Order item store bound to one connection or transaction.
pub struct OrderItemRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C> OrderItemRepository<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the repository to `conn`.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts all items in one statement.
    pub async fn create_batch(&self, items: &[order_item::Model]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let rows = items
            .iter()
            .cloned()
            .map(|item| item.into_active_model().reset_all());
        OrderItem::insert_many(rows)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}
