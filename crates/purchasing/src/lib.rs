//! Purchasing module: purchase orders placed with suppliers and the
//! receiving step that puts their units into stock.
//!
//! Stock is incremented server-side; this crate only shapes and checks the
//! payloads.

pub mod order;

pub use order::{NewPurchase, NewPurchaseLine, PurchaseCreated, PurchaseReceipt, ReceiveRequest};
