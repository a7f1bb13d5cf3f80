//! Products/catalog module.
//!
//! Wire types for the catalog endpoints plus the in-memory catalog the
//! storefront browses. Pure: no IO, no HTTP, no storage.

pub mod catalog;
pub mod product;

pub use catalog::ProductCatalog;
pub use product::{
    Brand, Category, NamedRef, NewBrand, NewCategory, NewUnit, PageMeta, Paged, Product,
    ProductInput, ProductQuery, Unit,
};
