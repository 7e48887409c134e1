use super::PageRequest;
use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::OnConflict,
};

/// Filters for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring match on the name; empty means no filter
    pub name: String,
    /// When true, only active products are returned
    pub active_only: bool,
}

/// Product store bound to one connection or transaction.
pub struct ProductRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C> ProductRepository<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the repository to `conn`.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Loads a product by id, holding an exclusive row lock until the
    /// surrounding transaction ends.
    pub async fn find_by_id(&self, id: i64) -> Result<product::Model> {
        Product::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .ok_or_else(|| Error::not_found(format!("product not found: {id}")))
    }

    /// Loads every product whose id is in `ids`, without locking. Missing ids
    /// are simply absent from the result.
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Like [`Self::find_by_ids`] but locks every returned row, in ascending id
    /// order.
    pub async fn find_by_ids_for_update(&self, ids: &[i64]) -> Result<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Id)
            .lock_exclusive()
            .all(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Whether a non-deleted product with exactly this name exists.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let count = Product::find()
            .filter(product::Column::Name.eq(name))
            .filter(product::Column::DeletedAt.is_null())
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Filtered listing; returns the requested page and the total row count.
    pub async fn find_with_filters(
        &self,
        filter: &ProductFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<product::Model>, u64)> {
        let mut query = Product::find().filter(product::Column::DeletedAt.is_null());
        if !filter.name.is_empty() {
            query = query.filter(product::Column::Name.contains(&filter.name));
        }
        if filter.active_only {
            query = query.filter(product::Column::IsActive.eq(true));
        }
        let query = query.order_by_asc(product::Column::Id);

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

    /// Inserts a new product and returns the stored row.
    pub async fn create(&self, product: product::ActiveModel) -> Result<product::Model> {
        product.insert(self.conn).await.map_err(Into::into)
    }

    /// Writes the stock and audit columns of `products`, keyed by id.
    pub async fn batch_upsert(&self, products: &[product::Model]) -> Result<()> {
        if products.is_empty() {
            return Ok(());
        }

        let rows = products.iter().cloned().map(|p| product::ActiveModel {
            id: Set(p.id),
            category_id: Set(p.category_id),
            name: Set(p.name),
            description: Set(p.description),
            stock: Set(p.stock),
            price: Set(p.price),
            image_url: Set(p.image_url),
            is_active: Set(p.is_active),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
            created_by: Set(p.created_by),
            updated_by: Set(p.updated_by),
            deleted_at: Set(p.deleted_at),
        });

        Product::insert_many(rows)
            .on_conflict(
                OnConflict::column(product::Column::Id)
                    .update_columns([
                        product::Column::Stock,
                        product::Column::UpdatedAt,
                        product::Column::UpdatedBy,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }
}
