//! Reconciliation of the server cart against the local cart.
//!
//! The diff is computed once, up front, from a single snapshot of the server
//! cart. Additions and quantity updates are planned in local cart order, one
//! per local line; removals follow in ascending product id order.
//!
//! # Guarantee
//! Once every planned operation has been applied, the server cart holds
//! exactly the local product ids with the local quantities.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use ironmonger_core::ProductId;

use crate::cart::CartItem;
use crate::pricing::CartSummary;
use crate::server_cart::ServerCart;

/// Body of the add and set-quantity item requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

/// A server line whose quantity differs from the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    pub product_id: ProductId,
    pub from: u32,
    pub to: u32,
}

/// One request against the server cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    Add(CartLine),
    Update(QuantityChange),
    Remove(ProductId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub steps: Vec<CartOp>,
}

impl ReconciliationPlan {
    /// Diff the local lines against a snapshot of the server cart.
    pub fn between(local: &[CartItem], server: &ServerCart) -> Self {
        let mut remaining = server.quantities();
        let mut steps = Vec::new();

        for item in local {
            match remaining.remove(&item.id) {
                Some(server_qty) if server_qty != item.quantity => {
                    steps.push(CartOp::Update(QuantityChange {
                        product_id: item.id,
                        from: server_qty,
                        to: item.quantity,
                    }));
                }
                Some(_) => {}
                None => steps.push(CartOp::Add(CartLine::new(item.id, item.quantity))),
            }
        }

        // Whatever was not claimed by a local line only exists server-side.
        steps.extend(remaining.into_keys().map(CartOp::Remove));
        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of requests applying this plan takes.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn additions(&self) -> Vec<CartLine> {
        self.steps
            .iter()
            .filter_map(|op| match op {
                CartOp::Add(line) => Some(*line),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<QuantityChange> {
        self.steps
            .iter()
            .filter_map(|op| match op {
                CartOp::Update(change) => Some(*change),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<ProductId> {
        self.steps
            .iter()
            .filter_map(|op| match op {
                CartOp::Remove(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// The product quantities a server would hold after applying the plan
    /// to `before`.
    pub fn apply_to(&self, before: &BTreeMap<ProductId, u32>) -> BTreeMap<ProductId, u32> {
        let mut after = before.clone();
        for op in &self.steps {
            match op {
                CartOp::Add(line) => {
                    after.insert(line.product_id, line.quantity);
                }
                CartOp::Update(change) => {
                    after.insert(change.product_id, change.to);
                }
                CartOp::Remove(id) => {
                    after.remove(id);
                }
            }
        }
        after
    }
}

/// Percentage the server cart is opened with when nothing else is known.
pub const DEFAULT_SEED_TAX_PERCENT: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Whole-number tax percentage used to open a server cart, e.g. `12`.
///
/// Computed as `round(tax / max(1, subtotal) * 100)`. A result of zero, or a
/// ratio that overflows, yields `fallback` instead.
pub fn seed_tax_percent(summary: &CartSummary, fallback: Decimal) -> Decimal {
    let base = summary.subtotal.max(Decimal::ONE);
    summary
        .tax
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .filter(|pct| !pct.is_zero())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingPolicy;
    use crate::server_cart::{CartStatus, ServerCartItem};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn local(id: i64, qty: u32) -> CartItem {
        CartItem::new(ProductId::new(id), format!("p{id}"), dec!(10), qty)
    }

    fn server(lines: &[(i64, u32)]) -> ServerCart {
        ServerCart {
            status: if lines.is_empty() { CartStatus::Empty } else { CartStatus::Cart },
            items: lines
                .iter()
                .map(|(id, qty)| ServerCartItem {
                    product_id: ProductId::new(*id),
                    name: String::new(),
                    quantity: *qty,
                    unit_price: dec!(10),
                    line_total: dec!(10) * Decimal::from(*qty),
                })
                .collect(),
            ..ServerCart::empty()
        }
    }

    #[test]
    fn empty_server_cart_gets_one_addition_per_local_line() {
        let plan = ReconciliationPlan::between(&[local(1, 2)], &server(&[]));

        assert_eq!(plan.steps, vec![CartOp::Add(CartLine::new(ProductId::new(1), 2))]);
        assert!(plan.updates().is_empty());
        assert!(plan.removals().is_empty());
    }

    #[test]
    fn server_only_products_are_removed() {
        let plan = ReconciliationPlan::between(&[], &server(&[(5, 3)]));

        assert!(plan.additions().is_empty());
        assert_eq!(plan.removals(), vec![ProductId::new(5)]);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn matching_quantities_produce_no_requests() {
        let plan = ReconciliationPlan::between(&[local(1, 2), local(2, 1)], &server(&[(2, 1), (1, 2)]));
        assert!(plan.is_empty());
    }

    #[test]
    fn differing_quantities_are_updated() {
        let plan = ReconciliationPlan::between(&[local(1, 4), local(3, 1)], &server(&[(1, 2), (7, 1)]));

        assert_eq!(
            plan.updates(),
            vec![QuantityChange { product_id: ProductId::new(1), from: 2, to: 4 }]
        );
        assert_eq!(plan.additions().len(), 1);
        assert_eq!(plan.removals(), vec![ProductId::new(7)]);
    }

    #[test]
    fn adds_and_updates_follow_local_line_order() {
        let plan = ReconciliationPlan::between(
            &[local(7, 1), local(2, 5), local(1, 2)],
            &server(&[(2, 1), (3, 1)]),
        );

        assert_eq!(
            plan.steps,
            vec![
                CartOp::Add(CartLine::new(ProductId::new(7), 1)),
                CartOp::Update(QuantityChange { product_id: ProductId::new(2), from: 1, to: 5 }),
                CartOp::Add(CartLine::new(ProductId::new(1), 2)),
                CartOp::Remove(ProductId::new(3)),
            ]
        );
    }

    #[test]
    fn cart_line_body_uses_qty() {
        let json = serde_json::to_value(CartLine::new(ProductId::new(4), 3)).unwrap();
        assert_eq!(json, serde_json::json!({"productId": 4, "qty": 3}));
    }

    #[test]
    fn seed_percent_comes_from_the_summary() {
        let summary = PricingPolicy::new(dec!(0.05), dec!(0)).summarize(1, dec!(200));
        assert_eq!(seed_tax_percent(&summary, DEFAULT_SEED_TAX_PERCENT), dec!(5));

        let summary = PricingPolicy::default().summarize(2, dec!(20));
        assert_eq!(seed_tax_percent(&summary, DEFAULT_SEED_TAX_PERCENT), dec!(12));
    }

    #[test]
    fn seed_percent_divides_by_at_least_one() {
        let summary = PricingPolicy::new(dec!(0.12), dec!(0)).summarize(1, dec!(0.5));
        assert_eq!(summary.tax, dec!(0.06));
        assert_eq!(seed_tax_percent(&summary, DEFAULT_SEED_TAX_PERCENT), dec!(6));
    }

    #[test]
    fn seed_percent_falls_back_when_it_rounds_to_zero() {
        let empty = PricingPolicy::default().summarize(0, Decimal::ZERO);
        assert_eq!(seed_tax_percent(&empty, DEFAULT_SEED_TAX_PERCENT), dec!(12));
        assert_eq!(seed_tax_percent(&empty, dec!(7)), dec!(7));

        let untaxed = PricingPolicy::new(Decimal::ZERO, dec!(0)).summarize(1, dec!(50));
        assert_eq!(seed_tax_percent(&untaxed, dec!(7)), dec!(7));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: applying the plan makes the server set-equal to the local cart.
        #[test]
        fn applied_plan_matches_local_cart(
            local_lines in prop::collection::btree_map(0i64..30, 1u32..50, 0..15),
            server_lines in prop::collection::btree_map(0i64..30, 1u32..50, 0..15),
        ) {
            let local_items: Vec<CartItem> =
                local_lines.iter().map(|(id, qty)| local(*id, *qty)).collect();
            let server_pairs: Vec<(i64, u32)> = server_lines.into_iter().collect();
            let snapshot = server(&server_pairs);

            let plan = ReconciliationPlan::between(&local_items, &snapshot);
            let after = plan.apply_to(&snapshot.quantities());

            let expected: BTreeMap<ProductId, u32> = local_lines
                .iter()
                .map(|(id, qty)| (ProductId::new(*id), *qty))
                .collect();
            prop_assert_eq!(after, expected);

            // Every removal was on the server and is absent locally.
            for id in &plan.removals() {
                prop_assert!(snapshot.quantities().contains_key(id));
                prop_assert!(!local_lines.contains_key(&id.get()));
            }
        }
    }
}
