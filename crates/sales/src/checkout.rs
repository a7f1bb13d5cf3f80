//! Checkout payload.
//!
//! Built once per checkout attempt from the local cart and never persisted.
//! The embedded summary is informational; the server computes the totals
//! it charges.

use serde::{Deserialize, Serialize};

use ironmonger_core::{DomainError, DomainResult};

use crate::cart::{CartItem, LocalCart};
use crate::pricing::{CartSummary, PricingPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Tax id printed on the receipt; "CF" (consumidor final) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nit: Option<String>,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            nit: None,
        }
    }

    pub fn nit_or_cf(&self) -> &str {
        self.nit
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("CF")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Pickup,
    #[serde(rename = "delivery")]
    HomeDelivery,
}

impl DeliveryMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "Retiro en tienda",
            DeliveryMethod::HomeDelivery => "Domicilio",
        }
    }
}

impl core::str::FromStr for DeliveryMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pickup" => Ok(DeliveryMethod::Pickup),
            "home_delivery" | "delivery" => Ok(DeliveryMethod::HomeDelivery),
            other => Err(DomainError::validation(format!("unknown delivery method '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Card => "Tarjeta",
            PaymentMethod::Transfer => "Transferencia",
        }
    }
}

impl core::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(DomainError::validation(format!("unknown payment method '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    /// Card voucher or transfer number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Payment {
    pub fn with_reference(method: PaymentMethod, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            method,
            reference: (!reference.trim().is_empty()).then_some(reference),
        }
    }
}

impl From<PaymentMethod> for Payment {
    fn from(method: PaymentMethod) -> Self {
        Self { method, reference: None }
    }
}

/// A checkout attempt: what is sent to the server plus the lines it covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
}

/// JSON body of the checkout call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckoutBody<'a> {
    pub customer: &'a CustomerInfo,
    pub delivery: &'a Delivery,
    pub payment: &'a Payment,
    pub summary: &'a CartSummary,
}

impl CheckoutRequest {
    /// Assemble the payload, rejecting what the checkout form would reject.
    ///
    /// An empty cart is accepted here: syncing it still has to clear the
    /// server cart, and the checkout call itself is refused afterwards.
    pub fn build(
        cart: &LocalCart,
        policy: &PricingPolicy,
        customer: CustomerInfo,
        delivery_method: DeliveryMethod,
        payment: impl Into<Payment>,
    ) -> DomainResult<Self> {
        if customer.name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        if !customer.email.contains('@') {
            return Err(DomainError::validation("customer email is invalid"));
        }
        let address = match delivery_method {
            DeliveryMethod::Pickup => None,
            DeliveryMethod::HomeDelivery => match customer.address.as_deref().map(str::trim) {
                Some(a) if !a.is_empty() => Some(a.to_string()),
                _ => return Err(DomainError::validation("home delivery requires an address")),
            },
        };

        Ok(Self {
            delivery: Delivery { method: delivery_method, address },
            payment: payment.into(),
            customer,
            items: cart.items().to_vec(),
            summary: cart.summary(policy),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn body(&self) -> CheckoutBody<'_> {
        CheckoutBody {
            customer: &self.customer,
            delivery: &self.delivery,
            payment: &self.payment,
            summary: &self.summary,
        }
    }
}
