//! Inventory module: stock levels and the rows of the stock report.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod stock;

pub use stock::{StockFilters, StockLevel, StockRow, StockTotals};
