//! `ironmonger-core`: shared building blocks for the store client.
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no storage).

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{BrandId, CategoryId, ProductId, PurchaseId, SaleId, SupplierId, UnitId, UserId};
pub use money::{round_money, Money};
