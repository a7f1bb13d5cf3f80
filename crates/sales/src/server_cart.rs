//! The cart resource held by the API.
//!
//! During checkout this is the source of truth; the client never uses its
//! amounts for display pricing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{ProductId, SaleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CartStatus {
    Cart,
    Paid,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
    pub status: CartStatus,
    /// Percentage the cart was opened with, e.g. `12` for 12%.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<ServerCartItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_total: Option<Decimal>,
    #[serde(default)]
    pub total: Decimal,
}

impl ServerCart {
    pub fn empty() -> Self {
        Self {
            sale_id: None,
            status: CartStatus::Empty,
            tax_rate: None,
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            discount_total: None,
            total: Decimal::ZERO,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == CartStatus::Paid
    }

    /// Product id to quantity. If the server ever lists a product twice, the
    /// later line wins.
    pub fn quantities(&self) -> BTreeMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect()
    }
}

/// Response of the checkout call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub sale_id: SaleId,
    pub status: CartStatus,
    pub total: Decimal,
}

impl CheckoutResult {
    pub fn is_paid(&self) -> bool {
        self.status == CartStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_a_paid_cart() {
        let body = r#"{
            "saleId": 91,
            "status": "PAID",
            "taxRate": 12,
            "items": [
                {"productId": 1, "name": "Martillo", "qty": 2, "unitPrice": 10, "lineTotal": 20}
            ],
            "subtotal": 20,
            "taxAmount": 2.4,
            "total": 22.4
        }"#;

        let cart: ServerCart = serde_json::from_str(body).unwrap();
        assert!(cart.is_paid());
        assert_eq!(cart.sale_id, Some(SaleId::new(91)));
        assert_eq!(cart.tax_amount, dec!(2.4));
        assert_eq!(cart.discount_total, None);
        assert_eq!(cart.tax_rate, Some(dec!(12)));
        assert_eq!(cart.quantities().get(&ProductId::new(1)), Some(&2));
    }

    #[test]
    fn empty_status_without_items() {
        let cart: ServerCart = serde_json::from_str(r#"{"status":"EMPTY"}"#).unwrap();
        assert_eq!(cart.status, CartStatus::Empty);
        assert!(cart.items.is_empty());
        assert_eq!(cart, ServerCart::empty());
    }

    #[test]
    fn checkout_result_is_read_from_the_short_response() {
        let result: CheckoutResult =
            serde_json::from_str(r#"{"saleId":9,"status":"PAID","total":22.4}"#).unwrap();
        assert!(result.is_paid());
        assert_eq!(result.sale_id, SaleId::new(9));
        assert_eq!(result.total, dec!(22.4));
    }

    #[test]
    fn null_sale_id_reads_as_no_sale() {
        let cart: ServerCart =
            serde_json::from_str(r#"{"saleId":null,"status":"CART","items":[]}"#).unwrap();
        assert_eq!(cart.sale_id, None);
        assert_eq!(cart.status, CartStatus::Cart);
    }

    #[test]
    fn line_quantity_is_read_from_qty() {
        let body = r#"{"status":"CART","items":[{"productId":4,"qty":3,"unitPrice":2,"lineTotal":6}]}"#;
        let cart: ServerCart = serde_json::from_str(body).unwrap();

        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.quantities().get(&ProductId::new(4)), Some(&3));
        assert_eq!(serde_json::to_value(&cart.items[0]).unwrap()["qty"], 3);
    }
}
