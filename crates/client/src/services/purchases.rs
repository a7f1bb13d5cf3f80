use ironmonger_core::{PurchaseId, UserId};
use ironmonger_inventory::StockRow;
use ironmonger_purchasing::{NewPurchase, PurchaseCreated, PurchaseReceipt, ReceiveRequest};

use crate::error::StoreError;
use crate::http::{ApiClient, ApiError};

/// Purchasing, receiving and the stock listing behind the stock report.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    api: ApiClient,
}

impl PurchaseService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Validates locally before sending.
    pub async fn create(&self, purchase: &NewPurchase) -> Result<PurchaseCreated, StoreError> {
        purchase.validate()?;
        Ok(self.api.post("/purchases", purchase).await?)
    }

    /// `POST /purchases/{id}/receive`: the server adds the units to stock.
    pub async fn receive(
        &self,
        id: PurchaseId,
        user_id: Option<UserId>,
    ) -> Result<PurchaseReceipt, ApiError> {
        self.api
            .post(&format!("/purchases/{id}/receive"), &ReceiveRequest { user_id })
            .await
    }

    pub async fn stock(&self) -> Result<Vec<StockRow>, ApiError> {
        self.api.get("/purchases/stock").await
    }
}
