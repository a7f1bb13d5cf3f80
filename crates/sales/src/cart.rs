//! Client-local shopping cart.
//!
//! # Invariants
//! - Item ids are unique within the cart.
//! - Every quantity is at least 1.
//!
//! Totals are never stored; they are recomputed from the items on every read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{round_money, ProductId};
use ironmonger_products::Product;

use crate::pricing::{CartSummary, PricingPolicy};

/// One cart line. Serialized as the persisted snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: u32,
    #[serde(
        default,
        rename = "image_url",
        alias = "image",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_ref: Option<String>,
}

impl CartItem {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
            image_ref: None,
        }
    }

    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image_ref: product.image_url.clone(),
        }
    }

    pub fn line_total(&self) -> Decimal {
        round_money(self.unit_price * Decimal::from(self.quantity))
    }
}

/// The cart held on the client before it is reconciled with the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCart {
    items: Vec<CartItem>,
}

impl LocalCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from a snapshot, restoring the invariants: duplicate
    /// ids are merged and zero quantities are raised to 1.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, or bump the quantity of the line with the same id.
    pub fn add(&mut self, mut item: CartItem) {
        let incoming = item.quantity.max(1);
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(incoming);
            }
            None => {
                item.quantity = incoming;
                self.items.push(item);
            }
        }
    }

    /// Set a line's quantity, clamped to at least 1. Returns `false` when the
    /// id is not in the cart.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        item.quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
        true
    }

    /// Returns the removed line, if there was one.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn summary(&self, policy: &PricingPolicy) -> CartSummary {
        policy.summarize(self.count(), self.subtotal())
    }
}
