//! Persistent wrapper around the local cart.
//!
//! Mutation logic lives in [`LocalCart`]; this store only adds the write to
//! durable storage after each committed mutation, including mutations that
//! turned out to be no-ops.

use std::sync::Arc;

use ironmonger_core::ProductId;
use ironmonger_sales::{CartItem, CartSummary, LocalCart, PricingPolicy};

use crate::storage::{self, keys, ClientStorage, StorageError};

pub struct CartStore {
    cart: LocalCart,
    pricing: PricingPolicy,
    storage: Arc<dyn ClientStorage>,
}

impl CartStore {
    /// Hydrate from the stored snapshot; a missing or unreadable snapshot
    /// yields an empty cart.
    pub async fn load(
        storage: Arc<dyn ClientStorage>,
        pricing: PricingPolicy,
    ) -> Result<Self, StorageError> {
        let items: Vec<CartItem> = storage::load_json(storage.as_ref(), keys::CART)
            .await?
            .unwrap_or_default();
        Ok(Self {
            cart: LocalCart::from_items(items),
            pricing,
            storage,
        })
    }

    pub fn cart(&self) -> &LocalCart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub fn summary(&self) -> CartSummary {
        self.cart.summary(&self.pricing)
    }

    pub async fn add(&mut self, item: CartItem) -> Result<(), StorageError> {
        self.cart.add(item);
        self.persist().await
    }

    /// Returns whether the id was in the cart.
    pub async fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Result<bool, StorageError> {
        let found = self.cart.set_quantity(id, quantity);
        self.persist().await?;
        Ok(found)
    }

    pub async fn remove(&mut self, id: ProductId) -> Result<Option<CartItem>, StorageError> {
        let removed = self.cart.remove(id);
        self.persist().await?;
        Ok(removed)
    }

    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<(), StorageError> {
        storage::save_json(self.storage.as_ref(), keys::CART, self.cart.items()).await
    }
}
