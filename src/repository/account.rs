use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, PaginatorTrait, QuerySelect, prelude::*};

/// Account store bound to one connection or transaction.
pub struct AccountRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C> AccountRepository<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the repository to `conn`.
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Loads an account by username, holding an exclusive row lock.
    pub async fn find_by_username(&self, username: &str) -> Result<account::Model> {
        Account::find()
            .filter(account::Column::Username.eq(username))
            .lock_exclusive()
            .one(self.conn)
            .await?
            .ok_or_else(|| Error::not_found(format!("account not found: {username}")))
    }

    /// Whether any account uses `username`.
    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let count = Account::find()
            .filter(account::Column::Username.eq(username))
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Whether any account uses `email`.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = Account::find()
            .filter(account::Column::Email.eq(email))
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Inserts a new account and returns the stored row.
    pub async fn create(&self, account: account::ActiveModel) -> Result<account::Model> {
        account.insert(self.conn).await.map_err(Into::into)
    }

    /// Overwrites every column of an existing account.
    pub async fn update(&self, account: account::Model) -> Result<account::Model> {
        account
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
            .map_err(Into::into)
    }
}
