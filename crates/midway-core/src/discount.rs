//! # Discount Codes
//!
//! Order-level discount codes and the single collapsed descriptor handed to
//! order submission.
//!
//! ## Amount Units
//! ```text
//! ┌──────────────────┬───────────────────────────────────────────────────┐
//! │ type             │ amount                                            │
//! ├──────────────────┼───────────────────────────────────────────────────┤
//! │ percentage       │ basis points   (2000 = 20% off every unit)        │
//! │ fixed_amount     │ cents          (500 = $5.00 spread over the order)│
//! │ shipping         │ cents          (ignored by item pricing)          │
//! └──────────────────┴───────────────────────────────────────────────────┘
//! ```
//!
//! A code with no amount is a configuration gap, not an error: it counts as
//! zero and is skipped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::line_item::LineItem;
use crate::money::Money;
use crate::types::Rate;

/// Kind of discount code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    Shipping,
}

/// A category- or vendor-scoped override of a code's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryOverride {
    /// Matched exactly against the line's vendor or category.
    pub category: String,

    /// Override amount, same units as the code's amount.
    #[serde(default)]
    pub discount: Option<i64>,

    /// Carried for the commerce platform; item pricing does not cap on it.
    #[serde(default)]
    pub max_quantity: Option<i64>,
}

/// A discount code active on the current order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountCode {
    pub code: String,

    #[serde(rename = "type")]
    pub kind: DiscountType,

    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub categories: Vec<CategoryOverride>,
}

fn rate_from_amount(amount: i64) -> Rate {
    Rate::from_bps(u32::try_from(amount).unwrap_or(0))
}

impl DiscountCode {
    /// A percentage code.
    pub fn percentage(code: impl Into<String>, rate: Rate) -> Self {
        DiscountCode {
            code: code.into(),
            kind: DiscountType::Percentage,
            amount: Some(rate.bps() as i64),
            categories: Vec::new(),
        }
    }

    /// A fixed-amount code.
    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        DiscountCode {
            code: code.into(),
            kind: DiscountType::FixedAmount,
            amount: Some(amount.cents()),
            categories: Vec::new(),
        }
    }

    /// Adds a category override (builder style).
    pub fn with_override(mut self, category: impl Into<String>, discount: Option<i64>) -> Self {
        self.categories.push(CategoryOverride {
            category: category.into(),
            discount,
            max_quantity: None,
        });
        self
    }

    /// Shipping codes never touch line prices.
    pub fn applies_to_items(&self) -> bool {
        self.kind != DiscountType::Shipping
    }

    /// The code's base percentage rate (zero if missing or negative).
    pub fn base_rate(&self) -> Rate {
        self.amount.map(rate_from_amount).unwrap_or_default()
    }

    /// Effective percentage rate for `item`.
    ///
    /// The last override whose category matches the item's vendor or
    /// category and carries an amount wins; otherwise the base rate.
    pub fn rate_for(&self, item: &LineItem) -> Rate {
        self.categories
            .iter()
            .rev()
            .filter(|entry| item.matches_category(&entry.category))
            .find_map(|entry| entry.discount)
            .map(rate_from_amount)
            .unwrap_or_else(|| self.base_rate())
    }

    /// The fixed amount to spread (zero if missing or negative).
    pub fn fixed_amount(&self) -> Money {
        Money::from_cents(self.amount.unwrap_or(0).max(0))
    }
}

/// All item discounts of an order collapsed into one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDiscount {
    /// Codes joined with `" & "`.
    pub code: String,

    #[serde(rename = "type")]
    pub kind: DiscountType,

    /// Total discount actually applied to the lines.
    pub amount: Money,
}

impl OrderDiscount {
    /// Collapses the item codes; `None` when nothing was applied.
    pub fn collapse(codes: &[DiscountCode], applied: Money) -> Option<OrderDiscount> {
        if applied.clamp_non_negative().is_zero() {
            return None;
        }
        let code = codes
            .iter()
            .filter(|code| code.applies_to_items())
            .map(|code| code.code.as_str())
            .collect::<Vec<_>>()
            .join(" & ");
        Some(OrderDiscount {
            code,
            kind: DiscountType::FixedAmount,
            amount: applied,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
