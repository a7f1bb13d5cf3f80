//! Display pricing of the local cart.
//!
//! These figures are informational. The server recomputes authoritative
//! totals at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::round_money;

/// Fixed tax rate and flat shipping fee applied to the local cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Fraction, e.g. `0.12` for 12%.
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
}

impl PricingPolicy {
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
    pub const DEFAULT_SHIPPING_FEE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

    pub fn new(tax_rate: Decimal, shipping_fee: Decimal) -> Self {
        Self {
            tax_rate,
            shipping_fee,
        }
    }

    pub fn summarize(&self, count: u64, subtotal: Decimal) -> CartSummary {
        let tax = round_money(subtotal * self.tax_rate);
        let shipping = if count == 0 {
            Decimal::ZERO
        } else {
            self.shipping_fee
        };
        CartSummary {
            count,
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TAX_RATE, Self::DEFAULT_SHIPPING_FEE)
    }
}

/// Derived totals of a cart at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    #[serde(default, skip_serializing)]
    pub count: u64,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}
