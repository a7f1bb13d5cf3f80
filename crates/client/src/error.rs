use thiserror::Error;

use ironmonger_core::DomainError;
use ironmonger_documents::DocumentError;

use crate::cart_sync::SyncError;
use crate::http::ApiError;
use crate::storage::StorageError;

/// Errors surfaced by the stores and the application state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("product {0} not found")]
    ProductNotFound(ironmonger_core::ProductId),
}

impl StoreError {
    /// Whether the failure came from a rejected session.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            StoreError::Api(err) => matches!(err, ApiError::Unauthorized),
            StoreError::Sync(err) => err.is_unauthorized(),
            _ => false,
        }
    }
}
