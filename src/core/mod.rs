//! Core business logic, independent of any transport.
//!
//! Every operation takes the shared [`sea_orm::DatabaseConnection`] and opens
//! its own transaction where it mutates state.

/// Registration, login and profile maintenance
pub mod account;
/// Password hashing, password policy and session tokens
pub mod auth;
/// Order submission, cancellation and order queries
pub mod order;
/// Pagination parameters and listing metadata
pub mod pagination;
/// Payment confirmation and card masking
pub mod payment;
/// Catalog queries and seeding
pub mod product;
/// Order, item and payment reference generation
pub mod reference;
