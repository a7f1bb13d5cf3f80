use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use ironmonger_core::ProductId;
use ironmonger_sales::{CartLine, CheckoutRequest, CheckoutResult, ServerCart};

use crate::cart_sync::SalesCartApi;
use crate::http::{ApiClient, ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCart {
    /// Whole percentage.
    tax_rate: Decimal,
}

/// Server cart and checkout endpoints.
#[derive(Debug, Clone)]
pub struct SalesService {
    api: ApiClient,
}

impl SalesService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SalesCartApi for SalesService {
    async fn ensure_cart(&self, tax_percent: Decimal) -> Result<ServerCart, ApiError> {
        self.api
            .post("/sales/cart", &CreateCart { tax_rate: tax_percent })
            .await
    }

    async fn fetch_cart(&self) -> Result<ServerCart, ApiError> {
        self.api.get("/sales/cart").await
    }

    async fn add_item(&self, line: CartLine) -> Result<(), ApiError> {
        self.api.post_empty("/sales/cart/items", &line).await
    }

    /// `PUT /sales/cart/items`; the product is named in the body.
    async fn update_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.api
            .put_empty("/sales/cart/items", &CartLine::new(product_id, quantity))
            .await
    }

    async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        self.api
            .delete(&format!("/sales/cart/items/{product_id}"))
            .await
    }

    async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResult, ApiError> {
        self.api.post("/sales/cart/checkout", &request.body()).await
    }
}
