//! # Return Netting
//!
//! Offsets negative-quantity (return) lines against the positive lines of
//! the same cart before any discount is computed.
//!
//! ## Algorithm
//! ```text
//! returns   = lines with quantity < 0   (cart order)
//! positives = lines with quantity > 0   (cart order; zero-quantity dropped)
//!
//! for each return:
//!     remaining = |price × quantity|
//!     first positive line with price × quantity >= remaining
//!         → unit price lowered by remaining / quantity, "RETURN" property
//!     none covers it
//!         → synthetic line worth -remaining appended after the positives
//!     always → one ReturnRecord
//! ```
//!
//! ## Cent Conservation
//! A reduction that does not divide evenly splits the line in two, the last
//! units taking the extra cent:
//! ```text
//! 3 × $5.00, return worth $1.00 → 2 × $4.67  +  1 × $4.66
//!                                 (-0.33 × 2)   (-0.34 × 1)  = -$1.00
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::line_item::{LineItem, LineItemProperty, PropertyKind};
use crate::money::Money;
use crate::types::KitchenRouting;

/// Refund bookkeeping for one return line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnRecord {
    /// Id of the return line.
    pub line_id: String,
    pub title: String,
    pub vendor: Option<String>,
    /// Units returned (positive).
    pub quantity: i64,
    pub unit_price: Money,
    /// Id of the line the return was netted against, if any.
    pub netted_against: Option<String>,
}

/// Output of [`net`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netted {
    pub items: Vec<LineItem>,
    pub returns: Vec<ReturnRecord>,
}

/// Splits `amount` over the units of `line`, lowering each unit's price.
///
/// Returns one part, or two when the last units absorb a remainder cent.
fn reduce_line(line: &LineItem, amount: Money, label: &str) -> Vec<LineItem> {
    let (each, remainder) = amount.split_across(line.quantity);
    let extra = each + Money::from_cents(1);

    let part = |quantity: i64, reduction: Money| {
        let mut part = line.split_part(quantity, line.price - reduction);
        part.full_price = part.price;
        part.properties
            .push(LineItemProperty::new(PropertyKind::Return, label, -reduction));
        part
    };

    let mut parts = Vec::with_capacity(2);
    if line.quantity > remainder {
        parts.push(part(line.quantity - remainder, each));
    }
    if remainder > 0 {
        parts.push(part(remainder, extra));
    }
    parts
}

/// Lines carrying return value that no positive line could absorb.
fn leftover_lines(ret: &LineItem, amount: Money) -> Vec<LineItem> {
    let quantity = ret.quantity.abs();
    let (each, remainder) = amount.split_across(quantity);
    let extra = each + Money::from_cents(1);

    let part = |quantity: i64, value: Money| {
        let mut part = ret.split_part(quantity, -value);
        part.full_price = part.price;
        part.no_discounts = true;
        part.kitchen = KitchenRouting::disabled();
        part
    };

    let mut parts = Vec::with_capacity(2);
    if quantity > remainder && !each.is_zero() {
        parts.push(part(quantity - remainder, each));
    }
    if remainder > 0 {
        parts.push(part(remainder, extra));
    }
    parts
}

/// Nets returns against positive lines.
///
/// Pure: works on copies of `items`.
pub fn net(items: &[LineItem]) -> Netted {
    let mut positives: Vec<LineItem> = items.iter().filter(|i| i.quantity > 0).cloned().collect();
    let mut leftovers = Vec::new();
    let mut returns = Vec::new();

    for ret in items.iter().filter(|i| i.is_return()) {
        let mut remaining = ret.line_total().abs();
        let mut netted_against = None;

        if remaining.is_positive() {
            let covering = positives
                .iter()
                .position(|line| line.line_total() >= remaining);

            if let Some(index) = covering {
                let label = format!("{} {} @ {}", ret.quantity.abs(), ret.title, ret.price);
                let parts = reduce_line(&positives[index], remaining, &label);
                netted_against = Some(positives[index].id.clone());
                positives.splice(index..=index, parts);
                remaining = Money::zero();
            }
        }

        if remaining.is_positive() {
            debug!(
                title = %ret.title,
                leftover_cents = remaining.cents(),
                "Return not covered by any line, adding leftover line"
            );
            leftovers.extend(leftover_lines(ret, remaining));
        }

        returns.push(ReturnRecord {
            line_id: ret.id.clone(),
            title: ret.title.clone(),
            vendor: ret.vendor.clone(),
            quantity: ret.quantity.abs(),
            unit_price: ret.price,
            netted_against,
        });
    }

    positives.extend(leftovers);
    Netted {
        items: positives,
        returns,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
