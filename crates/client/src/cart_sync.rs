//! Server cart synchronization and checkout submission.
//!
//! The reconciliation plan is computed once from a single fetch of the
//! server cart and then applied request by request. There is no rollback:
//! if a request fails, the server cart stays partially reconciled and the
//! error names the step that failed.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use ironmonger_core::ProductId;
use ironmonger_sales::{
    seed_tax_percent, CartLine, CartOp, CheckoutRequest, CheckoutResult, LocalCart,
    PricingPolicy, ReconciliationPlan, ServerCart,
};

use crate::http::ApiError;

/// The server cart endpoints reconciliation needs.
#[async_trait]
pub trait SalesCartApi: Send + Sync {
    /// Create the cart if none exists, else return the current one.
    /// `tax_percent` is a whole percentage such as `12`.
    async fn ensure_cart(&self, tax_percent: Decimal) -> Result<ServerCart, ApiError>;
    async fn fetch_cart(&self) -> Result<ServerCart, ApiError>;
    async fn add_item(&self, line: CartLine) -> Result<(), ApiError>;
    async fn update_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError>;
    async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError>;
    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResult, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    EnsureCart,
    FetchCart,
    Add(ProductId),
    Update(ProductId),
    Remove(ProductId),
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStep::EnsureCart => f.write_str("create cart"),
            SyncStep::FetchCart => f.write_str("fetch cart"),
            SyncStep::Add(id) => write!(f, "add product {id}"),
            SyncStep::Update(id) => write!(f, "update product {id}"),
            SyncStep::Remove(id) => write!(f, "remove product {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cart sync failed at {step}: {source}")]
    Reconcile {
        step: SyncStep,
        #[source]
        source: ApiError,
    },
    #[error("checkout failed: {0}")]
    Checkout(#[source] ApiError),
    #[error("cart is empty")]
    EmptyCart,
}

impl SyncError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SyncError::Reconcile { source, .. } => Some(source),
            SyncError::Checkout(source) => Some(source),
            SyncError::EmptyCart => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.api_error(), Some(ApiError::Unauthorized))
    }
}

fn at(step: SyncStep) -> impl FnOnce(ApiError) -> SyncError {
    move |source| SyncError::Reconcile { step, source }
}

pub struct CartSyncService {
    api: Arc<dyn SalesCartApi>,
    fallback_tax_percent: Decimal,
}

impl CartSyncService {
    pub fn new(api: Arc<dyn SalesCartApi>, fallback_tax_percent: Decimal) -> Self {
        Self {
            api,
            fallback_tax_percent,
        }
    }

    /// Make the server cart hold exactly the local lines. Returns the plan
    /// that was applied.
    pub async fn reconcile(
        &self,
        local: &LocalCart,
        pricing: &PricingPolicy,
    ) -> Result<ReconciliationPlan, SyncError> {
        let tax_percent = seed_tax_percent(&local.summary(pricing), self.fallback_tax_percent);
        self.api
            .ensure_cart(tax_percent)
            .await
            .map_err(at(SyncStep::EnsureCart))?;

        let server = self
            .api
            .fetch_cart()
            .await
            .map_err(at(SyncStep::FetchCart))?;

        let plan = ReconciliationPlan::between(local.items(), &server);
        tracing::info!(%tax_percent, requests = plan.len(), "reconciling server cart");

        for op in &plan.steps {
            match *op {
                CartOp::Add(line) => {
                    tracing::debug!(product_id = %line.product_id, quantity = line.quantity, "add");
                    self.api
                        .add_item(line)
                        .await
                        .map_err(at(SyncStep::Add(line.product_id)))?;
                }
                CartOp::Update(change) => {
                    tracing::debug!(
                        product_id = %change.product_id,
                        from = change.from,
                        to = change.to,
                        "update"
                    );
                    self.api
                        .update_item(change.product_id, change.to)
                        .await
                        .map_err(at(SyncStep::Update(change.product_id)))?;
                }
                CartOp::Remove(id) => {
                    tracing::debug!(product_id = %id, "remove");
                    self.api
                        .remove_item(id)
                        .await
                        .map_err(at(SyncStep::Remove(id)))?;
                }
            }
        }

        Ok(plan)
    }

    /// Reconcile, then submit. An empty local cart still empties the server
    /// cart but stops before the checkout call.
    pub async fn checkout(
        &self,
        local: &LocalCart,
        pricing: &PricingPolicy,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResult, SyncError> {
        self.reconcile(local, pricing).await?;
        if request.is_empty() {
            return Err(SyncError::EmptyCart);
        }
        let result = self
            .api
            .checkout(request)
            .await
            .map_err(SyncError::Checkout)?;
        tracing::info!(sale_id = %result.sale_id, status = ?result.status, total = %result.total, "checkout submitted");
        Ok(result)
    }
}
