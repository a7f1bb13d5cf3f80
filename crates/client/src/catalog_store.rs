//! Locally cached product catalog.

use std::sync::Arc;

use async_trait::async_trait;

use ironmonger_core::ProductId;
use ironmonger_products::{Product, ProductCatalog};

use crate::http::ApiError;
use crate::storage::{self, keys, ClientStorage, StorageError};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
}

/// Where the current catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Empty,
    Cache,
    Api,
}

pub struct CatalogStore {
    catalog: ProductCatalog,
    source: CatalogSource,
    storage: Arc<dyn ClientStorage>,
}

impl CatalogStore {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            catalog: ProductCatalog::new(),
            source: CatalogSource::Empty,
            storage,
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.catalog.find(id)
    }

    /// Load the cached snapshot, if any. Returns the number of products.
    pub async fn hydrate(&mut self) -> Result<usize, StorageError> {
        let products: Option<Vec<Product>> =
            storage::load_json(self.storage.as_ref(), keys::PRODUCTS).await?;
        if let Some(products) = products {
            self.catalog.replace(products);
            self.source = CatalogSource::Cache;
        }
        Ok(self.catalog.len())
    }

    /// Fetch the catalog and write it to the cache.
    pub async fn refresh(&mut self, api: &dyn CatalogApi) -> Result<usize, ApiError> {
        let products = api.list_products().await?;
        storage::save_json(self.storage.as_ref(), keys::PRODUCTS, &products).await?;
        self.catalog.replace(products);
        self.source = CatalogSource::Api;
        tracing::info!(products = self.catalog.len(), "catalog refreshed");
        Ok(self.catalog.len())
    }

    /// Refresh, falling back to the cached snapshot when the API cannot be
    /// reached. A 401 is not masked.
    pub async fn refresh_or_hydrate(&mut self, api: &dyn CatalogApi) -> Result<usize, ApiError> {
        match self.refresh(api).await {
            Ok(count) => Ok(count),
            Err(err @ ApiError::Network(_)) => {
                tracing::warn!(error = %err, "catalog unavailable; using cached snapshot");
                self.hydrate().await.map_err(ApiError::from)
            }
            Err(err) => Err(err),
        }
    }
}
