//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentStatus};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
