//! `ironmonger-client`: the storefront and back-office client for the
//! hardware store API.
//!
//! Owns everything with side effects: configuration, durable storage, the
//! authenticated HTTP wrapper, the session/cart/catalog stores, typed
//! endpoint services, server cart synchronization and the guarded
//! navigation used by the `ironmonger` shell.

pub mod cart_store;
pub mod cart_sync;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod http;
pub mod router;
pub mod services;
pub mod session_store;
pub mod state;
pub mod storage;

pub use cart_store::CartStore;
pub use cart_sync::{CartSyncService, SalesCartApi, SyncError, SyncStep};
pub use catalog_store::{CatalogApi, CatalogSource, CatalogStore};
pub use config::{ClientConfig, ConfigError, StorageLocation};
pub use error::StoreError;
pub use http::{ApiClient, ApiError, NoopInvalidator, SessionInvalidator};
pub use router::{Location, NavigationDecision, Navigator, RedirectToLogin, Route, RouteGuard, RouteTable};
pub use session_store::{AuthApi, SessionStore, SharedSession};
pub use state::{AppState, CheckoutFlow, CheckoutOutcome};
pub use storage::{ClientStorage, MemoryStorage, SqliteStorage, StorageError};
