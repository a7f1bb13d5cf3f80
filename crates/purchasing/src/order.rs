use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{
    round_money, DomainError, DomainResult, ProductId, PurchaseId, SupplierId, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseLine {
    pub product_id: ProductId,
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: u32,
    pub unit_cost: Decimal,
    /// Percentage, e.g. `12`. The server applies its default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
}

/// Body for `POST /purchases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub supplier_id: SupplierId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    pub items: Vec<NewPurchaseLine>,
}

impl NewPurchase {
    /// # Invariants
    /// - At least one line, each with a positive quantity.
    /// - A product appears on one line only.
    /// - Unit costs and tax rates are not negative.
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("purchase must have at least one line"));
        }

        let mut seen = std::collections::HashSet::new();
        for line in &self.items {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            if line.unit_cost.is_sign_negative() {
                return Err(DomainError::validation(format!(
                    "unit cost for product {} must not be negative",
                    line.product_id
                )));
            }
            if line.tax_rate.is_some_and(|rate| rate.is_sign_negative()) {
                return Err(DomainError::validation(format!(
                    "tax rate for product {} must not be negative",
                    line.product_id
                )));
            }
            if !seen.insert(line.product_id) {
                return Err(DomainError::invariant(format!(
                    "product {} appears on more than one line",
                    line.product_id
                )));
            }
        }
        Ok(())
    }

    /// Expected cost before tax, for confirmation before submitting.
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|l| round_money(l.unit_cost * Decimal::from(l.quantity)))
            .sum()
    }
}

/// Response of `POST /purchases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreated {
    pub purchase_id: PurchaseId,
    pub status: String,
}

/// Body for `POST /purchases/{id}/receive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Response of the receive call: the purchase is now in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub purchase_id: PurchaseId,
    pub status: String,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Decimal,
}

impl PurchaseReceipt {
    pub fn total(&self) -> Decimal {
        self.subtotal + self.tax
    }
}
