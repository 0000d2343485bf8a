//! # Order Snapshots
//!
//! The two crossings between the engine and the commerce platform:
//!
//! - [`OrderSubmission::from_computed`]: what gets sent when the order is
//!   placed
//! - [`restore_stored_order`]: how a placed order's lines look when they are
//!   loaded back into the register
//!
//! Neither talks to the platform; they only shape data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::{DiscountCode, OrderDiscount};
use crate::line_item::{LineItem, LineItemProperty, PropertyKind, TaxLine};
use crate::money::Money;
use crate::netting::ReturnRecord;
use crate::pricing::ComputedOrder;

/// Title of the line sent when nothing else is submittable.
pub const PLACEHOLDER_TITLE: &str = "N/A";

/// Snapshot handed to order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSubmission {
    pub line_items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_lines: Vec<TaxLine>,
    /// All item codes collapsed into one descriptor.
    pub discount: Option<OrderDiscount>,
    pub tax_exempt: bool,
    pub return_items: Vec<ReturnRecord>,
}

fn placeholder_line() -> LineItem {
    LineItem {
        id: String::new(),
        taxable: false,
        ..LineItem::new("", PLACEHOLDER_TITLE, Money::zero())
    }
}

impl OrderSubmission {
    /// Builds the submission snapshot.
    ///
    /// ## Rules
    /// - member add/edit lines, non-positive quantities and leftover return
    ///   value are not sent (refunds travel as `return_items`)
    /// - if nothing remains, a single `"N/A"` line (1 × $0.00) is sent
    /// - money totals are clamped at zero
    pub fn from_computed(order: &ComputedOrder, codes: &[DiscountCode]) -> Self {
        let mut line_items: Vec<LineItem> = order
            .line_items
            .iter()
            .filter(|item| item.quantity > 0 && !item.line_total().is_negative())
            .filter(|item| !item.function.is_some_and(|f| f.is_member_management()))
            .cloned()
            .collect();
        if line_items.is_empty() {
            line_items.push(placeholder_line());
        }

        OrderSubmission {
            line_items,
            subtotal: order.subtotal.clamp_non_negative(),
            tax: order.tax.clamp_non_negative(),
            total: order.total.clamp_non_negative(),
            tax_lines: order.tax_lines.clone(),
            discount: OrderDiscount::collapse(codes, order.discount_total),
            tax_exempt: order.tax_exempt,
            return_items: order.return_items.clone(),
        }
    }
}

/// Prepares lines of an order loaded back from the platform.
///
/// Each recorded discount allocation becomes a `"Discount"` property and
/// lowers the unit price by its per-unit share. No netting or discounting
/// runs on stored orders.
pub fn restore_stored_order(items: &[LineItem]) -> Vec<LineItem> {
    items
        .iter()
        .cloned()
        .map(|mut item| {
            let allocations = std::mem::take(&mut item.discount_allocations);
            for amount in allocations.iter().filter(|a| a.is_positive()) {
                item.properties.push(LineItemProperty::new(
                    PropertyKind::StoredDiscount,
                    format!("-{}", amount),
                    -*amount,
                ));
                if let Some(per_unit) = amount.scale(1, item.quantity) {
                    item.price -= per_unit;
                }
            }
            item.discount_allocations = allocations;
            item
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::pricing::recompute;
    use crate::types::{LineFunction, Rate};

    fn line(title: &str, cents: i64, quantity: i64) -> LineItem {
        let mut item = LineItem::new(title.to_uppercase(), title, Money::from_cents(cents));
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_submission_drops_member_lines() {
        let mut member = line("Season Pass Signup", 0, 1);
        member.function = Some(LineFunction::AddMember);
        let order = recompute(&[member, line("Hat", 1000, 1)], &[], false, &PricingConfig::default());

        let submission = OrderSubmission::from_computed(&order, &[]);
        assert_eq!(submission.line_items.len(), 1);
        assert_eq!(submission.line_items[0].title, "Hat");
        assert!(submission.discount.is_none());
        assert_eq!(submission.total.cents(), 1083);
    }

    #[test]
    fn test_empty_submission_gets_placeholder() {
        let order = recompute(&[line("Hat", 1000, -1)], &[], false, &PricingConfig::default());
        let submission = OrderSubmission::from_computed(&order, &[]);

        assert_eq!(submission.line_items.len(), 1);
        assert_eq!(submission.line_items[0].title, PLACEHOLDER_TITLE);
        assert_eq!(submission.line_items[0].quantity, 1);
        assert!(submission.line_items[0].price.is_zero());
        // Refund-only order: totals are negative before clamping
        assert!(order.total.is_negative());
        assert_eq!(submission.total, Money::zero());
        assert_eq!(submission.return_items.len(), 1);
    }

    #[test]
    fn test_submission_collapses_codes() {
        let codes = vec![
            DiscountCode::percentage("TEN", Rate::from_bps(1000)),
            DiscountCode::fixed("ONE", Money::from_cents(100)),
        ];
        let order = recompute(&[line("Hat", 1000, 1)], &codes, true, &PricingConfig::default());
        let submission = OrderSubmission::from_computed(&order, &codes);

        let discount = submission.discount.unwrap();
        assert_eq!(discount.code, "TEN & ONE");
        assert_eq!(discount.amount.cents(), 200);
    }

    #[test]
    fn test_restore_applies_allocations() {
        let mut item = line("Hat", 1000, 4);
        item.discount_allocations = vec![Money::from_cents(200), Money::zero()];

        let restored = restore_stored_order(&[item]);
        assert_eq!(restored[0].price.cents(), 950);
        assert_eq!(restored[0].properties.len(), 1);
        assert_eq!(restored[0].properties[0].kind, PropertyKind::StoredDiscount);
        assert_eq!(restored[0].properties[0].value, "-$2.00");
        assert_eq!(restored[0].discount_allocations.len(), 2);
    }
}
