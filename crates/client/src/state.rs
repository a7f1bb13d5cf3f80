//! Application state: every store and service, wired once at startup.
//!
//! Construction order matters: the session handle and navigator exist
//! before the HTTP client so the client's 401 handler can reach both.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use ironmonger_core::ProductId;
use ironmonger_documents::{
    generate_receipt, generate_stock_report, CompanyInfo, GeneratedDocument, ReceiptData,
    StockReport,
};
use ironmonger_inventory::StockFilters;
use ironmonger_sales::{
    CartItem, CheckoutRequest, CheckoutResult, CustomerInfo, DeliveryMethod, Payment,
};

use crate::cart_store::CartStore;
use crate::cart_sync::CartSyncService;
use crate::catalog_store::CatalogStore;
use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::http::ApiClient;
use crate::router::{NavigationDecision, Navigator, RedirectToLogin, RouteGuard};
use crate::services::{AdminService, AuthService, ProductService, PurchaseService, SalesService, UserService};
use crate::session_store::{SessionStore, SharedSession};
use crate::storage::{self, ClientStorage};

pub struct AppState {
    pub config: ClientConfig,
    pub storage: Arc<dyn ClientStorage>,
    pub api: ApiClient,
    pub navigator: Navigator,
    pub session: SessionStore,
    pub cart: CartStore,
    pub catalog: CatalogStore,
    pub products: ProductService,
    pub sales: SalesService,
    pub purchases: PurchaseService,
    pub users: UserService,
    pub admin: AdminService,
    pub sync: CartSyncService,
}

impl AppState {
    pub async fn build(config: ClientConfig) -> Result<Self, StoreError> {
        let storage = storage::open(&config.storage);
        Self::with_storage(config, storage).await
    }

    pub async fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn ClientStorage>,
    ) -> Result<Self, StoreError> {
        let shared_session = SharedSession::default();
        let navigator = Navigator::new(RouteGuard::default());
        let invalidator = Arc::new(RedirectToLogin::new(
            Arc::clone(&shared_session),
            navigator.clone(),
        ));
        let api = ApiClient::new(config.api_url.clone(), Arc::clone(&storage), invalidator);

        let session = SessionStore::new(
            Arc::new(AuthService::new(api.clone())),
            Arc::clone(&storage),
            shared_session,
        );
        let cart = CartStore::load(Arc::clone(&storage), config.pricing).await?;
        let mut catalog = CatalogStore::new(Arc::clone(&storage));
        catalog.hydrate().await?;

        let sales = SalesService::new(api.clone());
        let sync = CartSyncService::new(Arc::new(sales.clone()), config.fallback_tax_percent);

        Ok(Self {
            products: ProductService::new(api.clone()),
            purchases: PurchaseService::new(api.clone()),
            users: UserService::new(api.clone()),
            admin: AdminService::new(api.clone()),
            sales,
            sync,
            config,
            storage,
            api,
            navigator,
            session,
            cart,
            catalog,
        })
    }

    /// Route through the guard and commit the resulting location.
    pub async fn navigate(&mut self, target: &str) -> NavigationDecision {
        self.navigator.navigate(target, &mut self.session).await
    }

    /// Add a catalog product to the local cart, refreshing the catalog when
    /// the id is not known yet.
    pub async fn add_to_cart(&mut self, id: ProductId, quantity: u32) -> Result<CartItem, StoreError> {
        if self.catalog.find(id).is_none() {
            self.catalog.refresh_or_hydrate(&self.products).await?;
        }
        let product = self.catalog.find(id).ok_or(StoreError::ProductNotFound(id))?;
        let item = CartItem::from_product(product, quantity);
        self.cart.add(item.clone()).await?;
        Ok(item)
    }

    pub async fn checkout(
        &mut self,
        customer: CustomerInfo,
        delivery: DeliveryMethod,
        payment: impl Into<Payment>,
    ) -> Result<CheckoutOutcome, StoreError> {
        let mut outcome = CheckoutFlow::new(&mut self.cart, &self.sync)
            .submit(customer, delivery, payment)
            .await?;
        outcome.company = self.config.company.clone();
        Ok(outcome)
    }

    /// Fetch stock rows, narrow them by `filters` and render the report.
    pub async fn stock_report(
        &self,
        filters: StockFilters,
        title: Option<String>,
        file_name: Option<String>,
    ) -> Result<GeneratedDocument, StoreError> {
        let rows = self.purchases.stock().await?;
        let selected = filters.apply(&rows).cloned().collect();
        let mut report = StockReport::new(selected, filters, Utc::now());
        if let Some(title) = title {
            report = report.with_title(title);
        }
        report.file_name = file_name;
        Ok(generate_stock_report(&report)?)
    }
}

/// Checkout against the server: build the payload, reconcile, submit, and
/// clear the local cart once the server reports the sale as paid.
pub struct CheckoutFlow<'a> {
    cart: &'a mut CartStore,
    sync: &'a CartSyncService,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub request: CheckoutRequest,
    pub result: CheckoutResult,
    pub company: Option<CompanyInfo>,
}

impl CheckoutOutcome {
    pub fn is_paid(&self) -> bool {
        self.result.is_paid()
    }

    pub fn receipt(&self, issued_at: DateTime<Utc>) -> Result<GeneratedDocument, StoreError> {
        let mut data = ReceiptData::from_checkout(&self.result, &self.request, issued_at);
        if let Some(company) = &self.company {
            data = data.with_company(Some(company.clone()));
        }
        Ok(generate_receipt(&data)?)
    }
}

impl<'a> CheckoutFlow<'a> {
    pub fn new(cart: &'a mut CartStore, sync: &'a CartSyncService) -> Self {
        Self { cart, sync }
    }

    pub async fn submit(
        self,
        customer: CustomerInfo,
        delivery: DeliveryMethod,
        payment: impl Into<Payment>,
    ) -> Result<CheckoutOutcome, StoreError> {
        let request = CheckoutRequest::build(
            self.cart.cart(),
            self.cart.pricing(),
            customer,
            delivery,
            payment,
        )?;

        let result = self
            .sync
            .checkout(self.cart.cart(), self.cart.pricing(), &request)
            .await?;

        if result.is_paid() {
            self.cart.clear().await?;
        } else {
            tracing::warn!(status = ?result.status, "checkout not paid; keeping local cart");
        }

        Ok(CheckoutOutcome {
            request,
            result,
            company: None,
        })
    }
}
