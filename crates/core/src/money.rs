//! Decimal money helpers.
//!
//! Amounts are plain `Decimal`s in the store currency's standard unit
//! (quetzales, not cents). Currency formatting lives with the documents.

use rust_decimal::{Decimal, RoundingStrategy};

/// Amount in the store currency.
pub type Money = Decimal;

/// Round an amount to two decimal places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
