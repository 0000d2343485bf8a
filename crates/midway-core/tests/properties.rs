//! Property tests for the recomputation pass.

use midway_core::netting::net;
use midway_core::{recompute, DiscountCode, LineItem, Money, PricingConfig, PropertyKind, Rate};
use proptest::prelude::*;

fn arb_line() -> impl Strategy<Value = LineItem> {
    (0i64..5_000, 1i64..12, any::<bool>(), any::<bool>()).prop_map(|(cents, quantity, taxable, no_discounts)| {
        let mut item = LineItem::new("SKU", format!("Item {cents}"), Money::from_cents(cents));
        item.quantity = quantity;
        item.taxable = taxable;
        item.no_discounts = no_discounts;
        item
    })
}

fn arb_return() -> impl Strategy<Value = LineItem> {
    (1i64..5_000, 1i64..6).prop_map(|(cents, quantity)| {
        let mut item = LineItem::new("RET", format!("Return {cents}"), Money::from_cents(cents));
        item.quantity = -quantity;
        item
    })
}

fn arb_codes() -> impl Strategy<Value = Vec<DiscountCode>> {
    prop::collection::vec(
        prop_oneof![
            (0u32..=5_000).prop_map(|bps| DiscountCode::percentage(format!("P{bps}"), Rate::from_bps(bps))),
            (0i64..20_000).prop_map(|cents| DiscountCode::fixed(format!("F{cents}"), Money::from_cents(cents))),
        ],
        0..3,
    )
}

fn discounted_cents(items: &[LineItem]) -> i64 {
    items
        .iter()
        .map(|line| (line.full_total() - line.line_total()).cents())
        .sum()
}

/// Cents taken off by the per-unit "Off Each" labels of fixed codes.
fn off_each_cents(items: &[LineItem]) -> i64 {
    items
        .iter()
        .flat_map(|line| {
            line.properties
                .iter()
                .filter(|p| p.kind == PropertyKind::Discount && p.value.ends_with(" Off Each"))
                .map(move |p| -p.add_price.cents() * line.quantity)
        })
        .sum()
}

proptest! {
    #[test]
    fn fixed_discount_conserves_pennies(
        lines in prop::collection::vec(arb_line(), 1..6),
        amount in 0i64..20_000,
    ) {
        let code = DiscountCode::fixed("FIXED", Money::from_cents(amount));
        let order = recompute(&lines, &[code], true, &PricingConfig::default());

        if order.pre_discount_subtotal.is_positive() {
            prop_assert_eq!(discounted_cents(&order.line_items), amount);
            prop_assert_eq!(order.discount_total.cents(), amount);
        } else {
            prop_assert_eq!(order.discount_total, Money::zero());
        }
    }

    #[test]
    fn stacked_fixed_codes_conserve_pennies(
        lines in prop::collection::vec(arb_line(), 1..6),
        amounts in prop::collection::vec(0i64..20_000, 1..4),
        percent in prop::option::of(0u32..=5_000),
    ) {
        let mut codes: Vec<DiscountCode> = amounts
            .iter()
            .enumerate()
            .map(|(i, cents)| DiscountCode::fixed(format!("F{i}"), Money::from_cents(*cents)))
            .collect();
        if let Some(bps) = percent {
            codes.push(DiscountCode::percentage("PCT", Rate::from_bps(bps)));
        }
        let order = recompute(&lines, &codes, true, &PricingConfig::default());

        let fixed_total: i64 = amounts.iter().sum();
        if order.pre_discount_subtotal.is_positive() {
            prop_assert_eq!(off_each_cents(&order.line_items), fixed_total);
        } else {
            prop_assert_eq!(off_each_cents(&order.line_items), 0);
        }
    }

    #[test]
    fn total_is_subtotal_plus_tax(
        lines in prop::collection::vec(arb_line(), 0..6),
        returns in prop::collection::vec(arb_return(), 0..3),
        codes in arb_codes(),
        tax_exempt in any::<bool>(),
    ) {
        let items: Vec<LineItem> = lines.into_iter().chain(returns).collect();
        let order = recompute(&items, &codes, tax_exempt, &PricingConfig::default());

        prop_assert_eq!(order.total, order.subtotal + order.tax);
        let line_tax: Money = order
            .line_items
            .iter()
            .flat_map(|line| line.tax_lines.iter().map(|tax| tax.price))
            .sum();
        prop_assert_eq!(line_tax, order.tax);
        if tax_exempt {
            prop_assert_eq!(order.tax, Money::zero());
        }
    }

    #[test]
    fn recompute_is_deterministic(
        lines in prop::collection::vec(arb_line(), 0..6),
        returns in prop::collection::vec(arb_return(), 0..3),
        codes in arb_codes(),
    ) {
        let items: Vec<LineItem> = lines.into_iter().chain(returns).collect();
        let config = PricingConfig::default();
        let first = recompute(&items, &codes, false, &config);
        let second = recompute(&items, &codes, false, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn netting_preserves_cart_value(
        lines in prop::collection::vec(arb_line(), 0..6),
        returns in prop::collection::vec(arb_return(), 0..3),
    ) {
        let items: Vec<LineItem> = lines.into_iter().chain(returns.iter().cloned()).collect();
        let before: Money = items.iter().map(LineItem::line_total).sum();

        let netted = net(&items);
        let after: Money = netted.items.iter().map(LineItem::line_total).sum();

        prop_assert_eq!(before, after);
        prop_assert_eq!(netted.returns.len(), returns.len());
        prop_assert!(netted.items.iter().all(|line| line.quantity > 0));
    }
}
