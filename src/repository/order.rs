use super::PageRequest;
use crate::{
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, IntoActiveModel, PaginatorTrait, QueryOrder, QuerySelect,
    prelude::*,
};

/// Filters for an account's order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Substring match on the order reference; empty means no filter
    pub order_reference: String,
}

/// Order store bound to one connection or transaction.
pub struct OrderRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C> OrderRepository<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the repository to `conn`.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts a new order row.
    pub async fn create(&self, order: order::Model) -> Result<order::Model> {
        order
            .into_active_model()
            .reset_all()
            .insert(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Overwrites every column of an existing order.
    pub async fn update(&self, order: order::Model) -> Result<order::Model> {
        order
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Loads an order by reference, holding an exclusive row lock.
    pub async fn find_by_id(&self, order_reference: &str) -> Result<order::Model> {
        Order::find_by_id(order_reference.to_string())
            .lock_exclusive()
            .one(self.conn)
            .await?
            .ok_or_else(|| Error::not_found(format!("order not found: {order_reference}")))
    }

    /// Loads a locked order together with its items in line order.
    pub async fn find_by_id_with_items(
        &self,
        order_reference: &str,
    ) -> Result<(order::Model, Vec<order_item::Model>)> {
        let order = self.find_by_id(order_reference).await?;
        let items = OrderItem::find()
            .filter(order_item::Column::OrderReference.eq(order_reference))
            .order_by_asc(order_item::Column::LineNumber)
            .all(self.conn)
            .await?;
        Ok((order, items))
    }

    /// Orders of one account, newest first; returns the requested page and the
    /// total row count.
    pub async fn find_with_filters(
        &self,
        account_username: &str,
        filter: &OrderFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<order::Model>, u64)> {
        let mut query = Order::find()
            .filter(order::Column::AccountUsername.eq(account_username))
            .filter(order::Column::DeletedAt.is_null());
        if !filter.order_reference.is_empty() {
            query = query.filter(order::Column::OrderReference.contains(&filter.order_reference));
        }
        let query = query.order_by_desc(order::Column::OrderDate);

        match page {
            Some(page) => {
                let paginator = query.paginate(self.conn, page.per_page);
                let total = paginator.num_items().await?;
                let rows = paginator.fetch_page(page.page.saturating_sub(1)).await?;
                Ok((rows, total))
            }
            None => {
                let rows = query.all(self.conn).await?;
                let total = rows.len() as u64;
                Ok((rows, total))
            }
        }
    }
}
