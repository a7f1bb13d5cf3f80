//! Sales module: the local cart, its pricing, the server-held cart and the
//! plan that reconciles the two before checkout.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Persisting the cart and
//! talking to the sales endpoints is the client crate's job.

pub mod cart;
pub mod checkout;
pub mod pricing;
pub mod reconcile;
pub mod server_cart;

pub use cart::{CartItem, LocalCart};
pub use checkout::{
    CheckoutBody, CheckoutRequest, CustomerInfo, Delivery, DeliveryMethod, Payment, PaymentMethod,
};
pub use pricing::{CartSummary, PricingPolicy};
pub use reconcile::{
    seed_tax_percent, CartLine, CartOp, QuantityChange, ReconciliationPlan,
    DEFAULT_SEED_TAX_PERCENT,
};
pub use server_cart::{CartStatus, CheckoutResult, ServerCart, ServerCartItem};
