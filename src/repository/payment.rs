use crate::{
    entities::{Payment, payment},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, QuerySelect, prelude::*};

/// Payment store bound to one connection or transaction.
pub struct PaymentRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C> PaymentRepository<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the repository to `conn`.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Inserts a new payment row.
    pub async fn create(&self, payment: payment::Model) -> Result<payment::Model> {
        payment
            .into_active_model()
            .reset_all()
            .insert(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Overwrites every column of an existing payment.
    pub async fn update(&self, payment: payment::Model) -> Result<payment::Model> {
        payment
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
            .map_err(Into::into)
    }

    /// Loads the payment attached to an order, locking it for update.
    pub async fn find_by_order_reference(&self, order_reference: &str) -> Result<payment::Model> {
        Payment::find()
            .filter(payment::Column::OrderReference.eq(order_reference))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("payment not found for order: {order_reference}"))
            })
    }
}
