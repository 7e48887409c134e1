//! Data-access handles.
//!
//! Each repository borrows a connection, which is either the pool or an open
//! transaction. A unit of work builds its handles from the transaction it just
//! began, so every read and write inside it shares one atomic scope:
//!
//! ```ignore
//! let txn = db.begin().await?;
//! let products = ProductRepository::new(&txn);
//! let orders = OrderRepository::new(&txn);
//! ```
//!
//! Lookups that feed a mutation take an exclusive row lock
//! (`SELECT ... FOR UPDATE`) that is held until the transaction ends.

pub mod account;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;

pub use account::AccountRepository;
pub use order::{OrderFilter, OrderRepository};
pub use order_item::OrderItemRepository;
pub use payment::PaymentRepository;
pub use product::{ProductFilter, ProductRepository};

/// Page selection for filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Rows per page
    pub per_page: u64,
}
