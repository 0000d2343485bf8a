//! # Order Recomputation
//!
//! The pure pass that runs on every cart mutation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart lines (copied)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  net()                 returns offset against positive lines            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discounts             percentage: summed rate, one property per line   │
//! │                        fixed: proportional share of each code,          │
//! │                               line split so no cent is lost             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tax                   per line, round(line × rate)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  totals                total = subtotal + tax (exact, cents)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  derive_tickets()      kitchen display entries                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call starts from fresh per-code balances, so identical inputs give
//! identical output. Nothing here can fail: missing amounts count as zero and
//! rounding remainders are assigned, not dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::config::PricingConfig;
use crate::discount::{DiscountCode, DiscountType};
use crate::kitchen::{derive_tickets, KitchenTicketItem};
use crate::line_item::{LineItem, LineItemProperty, PropertyKind, TaxLine};
use crate::money::Money;
use crate::netting::{net, Netted, ReturnRecord};
use crate::types::Rate;

/// A fully priced order. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputedOrder {
    pub line_items: Vec<LineItem>,
    pub return_items: Vec<ReturnRecord>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_lines: Vec<TaxLine>,
    pub kitchen_items: Vec<KitchenTicketItem>,
    /// Sum of `full_price × quantity` over discountable lines.
    pub pre_discount_subtotal: Money,
    /// Cart-level discount actually taken off the lines.
    pub discount_total: Money,
    pub tax_exempt: bool,
}

/// Nets, discounts and taxes the cart lines.
pub fn recompute(
    items: &[LineItem],
    codes: &[DiscountCode],
    tax_exempt: bool,
    config: &PricingConfig,
) -> ComputedOrder {
    compute_order(net(items), codes, tax_exempt, config)
}

/// Running balance of one fixed-amount code during a pass.
struct FixedBalance<'a> {
    code: &'a str,
    remaining: Money,
}

/// Discounts and taxes already-netted lines.
pub fn compute_order(
    netted: Netted,
    codes: &[DiscountCode],
    tax_exempt: bool,
    config: &PricingConfig,
) -> ComputedOrder {
    let percentage_codes: Vec<&DiscountCode> = codes
        .iter()
        .filter(|c| c.kind == DiscountType::Percentage)
        .collect();
    let mut balances: Vec<FixedBalance<'_>> = codes
        .iter()
        .filter(|c| c.kind == DiscountType::FixedAmount)
        .map(|c| FixedBalance {
            code: &c.code,
            remaining: c.fixed_amount(),
        })
        .collect();

    let pre_discount_subtotal: Money = netted
        .items
        .iter()
        .filter(|i| !i.no_discounts)
        .map(LineItem::full_total)
        .sum();

    if !pre_discount_subtotal.is_positive() {
        for balance in balances.iter().filter(|b| b.remaining.is_positive()) {
            debug!(
                code = balance.code,
                amount_cents = balance.remaining.cents(),
                "Nothing to discount, fixed amount forfeited"
            );
        }
    }

    let mut running_subtotal = pre_discount_subtotal;
    let mut discount_total = Money::zero();
    let mut rebuilt = Vec::with_capacity(netted.items.len());

    for mut item in netted.items {
        if item.no_discounts {
            rebuilt.push(item);
            continue;
        }

        // Percentage: every code's effective rate, applied once
        let rate = percentage_codes
            .iter()
            .fold(Rate::zero(), |acc, code| acc.saturating_add(code.rate_for(&item)));
        let percent_off = item.price.percentage(rate);
        if percent_off.is_positive() {
            item.properties.push(LineItemProperty::new(
                PropertyKind::Discount,
                format!("{}% OFF", rate.whole_percent()),
                -percent_off,
            ));
            item.price -= percent_off;
            discount_total += percent_off.multiply_quantity(item.quantity);
        }

        // Fixed: this line's share of what each code has left
        let item_value = item.full_total();
        let mut fixed_off = Money::zero();
        if running_subtotal.is_positive() {
            for balance in balances.iter_mut().filter(|b| b.remaining.is_positive()) {
                let share = balance
                    .remaining
                    .scale(item_value.cents(), running_subtotal.cents())
                    .unwrap_or_default()
                    .clamp(Money::zero(), balance.remaining);
                balance.remaining -= share;
                fixed_off += share;
            }
        }
        running_subtotal -= item_value;

        if fixed_off.is_positive() {
            discount_total += fixed_off;
            rebuilt.extend(split_fixed_discount(&item, fixed_off));
        } else {
            rebuilt.push(item);
        }
    }

    let mut subtotal = Money::zero();
    let mut tax = Money::zero();
    for item in &mut rebuilt {
        item.tax_lines.clear();
        if item.taxable && !tax_exempt {
            let line_tax = item.line_total().calculate_tax(config.tax_rate);
            item.tax_lines.push(TaxLine {
                title: config.tax_title.clone(),
                rate: config.tax_rate,
                price: line_tax,
            });
            tax += line_tax;
        }
        subtotal += item.line_total();
    }
    let total = subtotal + tax;

    debug!(
        lines = rebuilt.len(),
        subtotal_cents = subtotal.cents(),
        tax_cents = tax.cents(),
        total_cents = total.cents(),
        "Order recomputed"
    );

    ComputedOrder {
        kitchen_items: derive_tickets(&rebuilt, config),
        line_items: rebuilt,
        return_items: netted.returns,
        subtotal,
        tax,
        total,
        tax_lines: vec![TaxLine {
            title: config.tax_title.clone(),
            rate: config.tax_rate,
            price: tax,
        }],
        pre_discount_subtotal,
        discount_total,
        tax_exempt,
    }
}

/// Spreads a fixed discount over the units of `item`.
///
/// When the cents do not divide evenly the last units take one extra cent,
/// so the line is split into a base part and a +1¢ part.
fn split_fixed_discount(item: &LineItem, amount: Money) -> Vec<LineItem> {
    let (each, remainder) = amount.split_across(item.quantity);

    let part = |quantity: i64, off: Money| {
        let mut part = item.split_part(quantity, item.price - off);
        if off.is_positive() {
            part.properties.push(LineItemProperty::new(
                PropertyKind::Discount,
                format!("{} Off Each", off),
                -off,
            ));
        }
        part
    };

    let mut parts = Vec::with_capacity(2);
    if item.quantity > remainder {
        parts.push(part(item.quantity - remainder, each));
    }
    if remainder > 0 {
        parts.push(part(remainder, each + Money::from_cents(1)));
    }
    parts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(title: &str, cents: i64, quantity: i64) -> LineItem {
        let mut item = LineItem::new(title.to_uppercase(), title, Money::from_cents(cents));
        item.quantity = quantity;
        item
    }

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    #[test]
    fn test_fixed_discount_split_example() {
        let order = recompute(
            &[line("Fries", 500, 3)],
            &[DiscountCode::fixed("DOLLAR", Money::from_cents(100))],
            true,
            &config(),
        );

        assert_eq!(order.line_items.len(), 2);
        let base = &order.line_items[0];
        let plus = &order.line_items[1];
        assert_eq!((base.quantity, base.price.cents()), (2, 467));
        assert_eq!((plus.quantity, plus.price.cents()), (1, 466));
        assert_eq!(base.properties[0].value, "$0.33 Off Each");
        assert_eq!(plus.properties[0].value, "$0.34 Off Each");
        assert_eq!(order.subtotal.cents(), 1400);
        assert_eq!(order.discount_total.cents(), 100);
    }

    #[test]
    fn test_fixed_discount_proportional_across_lines() {
        let order = recompute(
            &[line("Shirt", 1500, 1), line("Hat", 500, 1)],
            &[DiscountCode::fixed("FOUR", Money::from_cents(400))],
            true,
            &config(),
        );
        assert_eq!(order.line_items[0].price.cents(), 1200);
        assert_eq!(order.line_items[1].price.cents(), 400);
        assert_eq!(order.pre_discount_subtotal.cents(), 2000);
    }

    #[test]
    fn test_percentage_codes_stack_and_override() {
        let mut soda = line("Soda", 1000, 1);
        soda.category = Some("drinks".to_string());
        let codes = vec![
            DiscountCode::percentage("TEN", Rate::from_bps(1000)),
            DiscountCode::percentage("DRINKS", Rate::from_bps(500)).with_override("drinks", Some(1500)),
        ];
        let order = recompute(&[soda, line("Hat", 1000, 1)], &codes, true, &config());

        assert_eq!(order.line_items[0].price.cents(), 750);
        assert_eq!(order.line_items[0].properties[0].value, "25% OFF");
        assert_eq!(order.line_items[1].price.cents(), 850);
        assert_eq!(order.discount_total.cents(), 400);
    }

    #[test]
    fn test_percentage_label_is_whole_percent() {
        let codes = vec![DiscountCode::percentage("HALFTEN", Rate::from_bps(1250))];
        let order = recompute(&[line("Hat", 1000, 1)], &codes, true, &config());

        let label = &order.line_items[0].properties[0];
        assert_eq!(label.value, "13% OFF");
        assert_eq!(label.add_price.cents(), -125);
        assert_eq!(order.line_items[0].price.cents(), 875);
    }

    #[test]
    fn test_no_discounts_line_untouched() {
        let mut gift_card = line("Gift Card", 2500, 1);
        gift_card.no_discounts = true;
        gift_card.taxable = false;
        let order = recompute(
            &[gift_card, line("Hat", 1000, 1)],
            &[DiscountCode::fixed("FIVE", Money::from_cents(500))],
            false,
            &config(),
        );

        assert_eq!(order.line_items[0].price.cents(), 2500);
        assert!(order.line_items[0].properties.is_empty());
        assert_eq!(order.line_items[1].price.cents(), 500);
        assert_eq!(order.pre_discount_subtotal.cents(), 1000);
    }

    #[test]
    fn test_tax_per_line_and_total_identity() {
        let order = recompute(&[line("Hat", 1000, 2), line("Soda", 299, 1)], &[], false, &config());

        // 2000 × 8.25% = 165, 299 × 8.25% = 24.67 → 25
        assert_eq!(order.line_items[0].tax_lines[0].price.cents(), 165);
        assert_eq!(order.line_items[1].tax_lines[0].price.cents(), 25);
        assert_eq!(order.tax.cents(), 190);
        assert_eq!(order.subtotal.cents(), 2299);
        assert_eq!(order.total, order.subtotal + order.tax);
        assert_eq!(order.tax_lines.len(), 1);
        assert_eq!(order.tax_lines[0].title, "Sales Tax");
    }

    #[test]
    fn test_zero_subtotal_forfeits_fixed_amount() {
        let mut free = line("Wristband", 0, 1);
        free.taxable = false;
        let order = recompute(
            &[free],
            &[DiscountCode::fixed("FIVE", Money::from_cents(500))],
            false,
            &config(),
        );
        assert_eq!(order.discount_total, Money::zero());
        assert_eq!(order.total, Money::zero());
    }

    #[test]
    fn test_shipping_codes_ignored() {
        let shipping = DiscountCode {
            code: "SHIP".to_string(),
            kind: DiscountType::Shipping,
            amount: Some(500),
            categories: Vec::new(),
        };
        let order = recompute(&[line("Hat", 1000, 1)], &[shipping], true, &config());
        assert_eq!(order.subtotal.cents(), 1000);
        assert!(order.line_items[0].properties.is_empty());
    }

    #[test]
    fn test_missing_amount_skipped() {
        let code = DiscountCode {
            code: "BLANK".to_string(),
            kind: DiscountType::Percentage,
            amount: None,
            categories: Vec::new(),
        };
        let order = recompute(&[line("Hat", 1000, 1)], &[code], true, &config());
        assert_eq!(order.subtotal.cents(), 1000);
    }
}
