//! # Money Module
//!
//! Provides the `Money` type and the cent-exact arithmetic the pricing
//! engine is built on.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A $1.00 fixed discount spread over 3 units:                            │
//! │    1.00 / 3 = 0.3333...  → 0.33 × 3 = 0.99   → Lost $0.01!              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit remainders                      │
//! │    100 cents / 3 = 33 remainder 1                                       │
//! │    2 units @ 33 + 1 unit @ 34 = 100 cents   → Nothing lost              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use midway_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2;             // $21.98
//! assert_eq!(doubled.cents(), 2198);
//!
//! let (each, remainder) = Money::from_cents(100).split_across(3);
//! assert_eq!((each.cents(), remainder), (33, 1));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::Rate;

// =============================================================================
// Rounding
// =============================================================================

/// Integer division rounded half away from zero.
///
/// This is the integer equivalent of "round to 2 places" on a dollar amount
/// when both operands are expressed in cents (or cent fractions).
///
/// ```rust
/// use midway_core::money::div_round;
///
/// assert_eq!(div_round(5, 2), 3);
/// assert_eq!(div_round(-5, 2), -3);
/// assert_eq!(div_round(4, 3), 1);
/// ```
pub fn div_round(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator != 0, "div_round by zero");
    let (n, d) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: return lines and discounts are negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as plain cents**: `{"price": 1099}`
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CatalogButton.price ──► LineItem.price ──► (modifiers) ──► netting     │
/// │                                                               │         │
/// │                                   discounts ◄─────────────────┘         │
/// │                                       │                                 │
/// │                                       ▼                                 │
/// │                    ComputedOrder.subtotal + tax = total                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use midway_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal dollar string such as `"12.99"`, `"-3.5"` or `"7"`.
    ///
    /// At most two fractional digits are accepted; anything else is a
    /// [`CoreError::InvalidAmount`].
    ///
    /// ```rust
    /// use midway_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.99").unwrap().cents(), 1299);
    /// assert_eq!(Money::parse_decimal("-3.5").unwrap().cents(), -350);
    /// assert!(Money::parse_decimal("1.999").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidAmount(input.to_string());
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?
        };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid())?,
        };

        let cents = whole_cents + frac_cents;
        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the dollar portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the larger of `self` and zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Multiplies a unit price by a (possibly negative) quantity.
    ///
    /// ```rust
    /// use midway_core::money::Money;
    ///
    /// let line_total = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` of this amount, rounded to the cent.
    ///
    /// This is `round2(amount * pct / 100)`, done in integer math.
    ///
    /// ```rust
    /// use midway_core::money::Money;
    /// use midway_core::types::Rate;
    ///
    /// let price = Money::from_cents(899);
    /// // $8.99 × 15% = $1.3485 → $1.35
    /// assert_eq!(price.percentage(Rate::from_bps(1500)).cents(), 135);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        let cents = div_round(self.0 as i128 * rate.bps() as i128, 10_000);
        Money(cents as i64)
    }

    /// Calculates tax on this amount at `rate`, rounded half away from zero.
    ///
    /// ## Why not `round(amount × 1.0825) − amount`?
    /// For an integer number of cents the two are identical: the amount
    /// itself carries no fraction, so only the tax part is rounded.
    ///
    /// ```rust
    /// use midway_core::money::Money;
    /// use midway_core::types::Rate;
    ///
    /// // $10.00 × 8.25% = $0.825 → $0.83
    /// let tax = Money::from_cents(1000).calculate_tax(Rate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Line: 2 × $10.00 (taxable)
    ///      │
    ///      ▼
    /// calculate_tax(8.25%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax line: $1.65
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: Rate) -> Money {
        self.percentage(rate)
    }

    /// Scales this amount by `numerator / denominator`, rounded to the cent.
    ///
    /// Used for proportional allocation: an item's share of a fixed discount
    /// is `remaining × item_value / subtotal`. Returns `None` when the
    /// denominator is zero.
    pub fn scale(&self, numerator: i64, denominator: i64) -> Option<Money> {
        if denominator == 0 {
            return None;
        }
        let cents = div_round(self.0 as i128 * numerator as i128, denominator as i128);
        Some(Money(cents as i64))
    }

    /// Splits a non-negative amount evenly across `qty` units.
    ///
    /// Returns the per-unit floor and how many units must take one extra
    /// cent. `each × (qty − remainder) + (each + 1¢) × remainder` always
    /// equals the original amount.
    ///
    /// ```text
    /// 100¢ across 3 units
    ///      │
    ///      ▼
    /// each = 33¢, remainder = 1
    ///      │
    ///      ▼
    /// 2 × 33¢ + 1 × 34¢ = 100¢
    /// ```
    pub fn split_across(&self, qty: i64) -> (Money, i64) {
        debug_assert!(qty > 0, "split_across needs a positive quantity");
        debug_assert!(self.0 >= 0, "split_across needs a non-negative amount");
        let qty = qty.max(1);
        (Money(self.0 / qty), self.0 % qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$10.99` / `-$5.50`; used for property labels.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
