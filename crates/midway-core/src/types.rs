//! # Domain Types
//!
//! Small value types shared by every stage of the pricing pipeline.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shared Value Types                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │   ModClassId    │   │ KitchenRouting  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  u32            │   │  enabled        │       │
//! │  │  825 = 8.25%    │   │  12003 =        │   │  station        │       │
//! │  │  2000 = 20% off │   │  group 12,      │   │  fulfillable    │       │
//! │  └─────────────────┘   │  sub-class 3    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  LineFunction   │   │ModifierFunction │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  redeem_gc      │   │  none / prefix  │                             │
//! │  │  check_in ...   │   │  suffix / swap  │                             │
//! │  └─────────────────┘   │  overwrite      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Tax (825 = 8.25%) and percentage
/// discounts (2000 = 20%) both stay integers all the way through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for config files and env vars).
    ///
    /// Negative or non-finite input yields zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Rate(0);
        }
        Rate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two rates (stacked percentage discounts).
    #[inline]
    pub const fn saturating_add(self, other: Rate) -> Rate {
        Rate(self.0.saturating_add(other.0))
    }

    /// Rounds to a whole percent, halves up: `12.5` → `13`.
    #[inline]
    pub const fn whole_percent(&self) -> u32 {
        self.0.saturating_add(50) / 100
    }

    /// Returns the rate as a decimal fraction, e.g. `0.0825`.
    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

/// Prints the percentage without trailing zeros: `20`, `8.25`, `12.5`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}", whole, frac)
        }
    }
}

// =============================================================================
// Modifier Classes
// =============================================================================

/// Identifier of a modifier class ("burger toppings", "drink sizes", ...).
///
/// Composite classes encode `parent_group * 1000 + sub_class`.
pub type ModClassId = u32;

/// Returns the parent group of a composite class id.
///
/// ```rust
/// use midway_core::types::parent_group;
///
/// assert_eq!(parent_group(12003), 12);
/// assert_eq!(parent_group(7), 0);
/// ```
#[inline]
pub const fn parent_group(class: ModClassId) -> ModClassId {
    class / 1000
}

/// Returns the sub-class part of a composite class id.
#[inline]
pub const fn sub_class(class: ModClassId) -> ModClassId {
    class % 1000
}

/// Collects `required ∪ optional` in order, without duplicates.
pub fn union_classes(required: &[ModClassId], optional: &[ModClassId]) -> Vec<ModClassId> {
    let mut out: Vec<ModClassId> = Vec::with_capacity(required.len() + optional.len());
    for class in required.iter().chain(optional) {
        if !out.contains(class) {
            out.push(*class);
        }
    }
    out
}

// =============================================================================
// Kitchen Routing
// =============================================================================

/// How an item (or an annotation on it) reaches the kitchen display.
///
/// - `enabled`: appears on a KDS ticket at all
/// - `station`: which screen; `None` means the configured default
/// - `fulfillable`: an annotation that becomes its own ticket line
///   instead of a special instruction on the parent item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenRouting {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub station: Option<String>,

    #[serde(default)]
    pub fulfillable: bool,
}

impl KitchenRouting {
    /// Routing that keeps an entry off the kitchen display.
    pub fn disabled() -> Self {
        KitchenRouting::default()
    }

    /// Routing to a given station.
    pub fn station(station: impl Into<String>) -> Self {
        KitchenRouting {
            enabled: true,
            station: Some(station.into()),
            fulfillable: false,
        }
    }
}

// =============================================================================
// Behavioral Tags
// =============================================================================

/// What a line item *does* beyond being sold.
///
/// The pricing pass is indifferent to most of these; the order submission
/// snapshot drops member-management lines, and `custom_rate` lines accept
/// a typed `qty*rate` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineFunction {
    /// Redeems value from a gift card.
    RedeemGiftCard,
    /// Prints/assigns a wristband.
    Wristband,
    /// Creates a membership record after submission.
    AddMember,
    /// Edits a membership record after submission.
    EditMember,
    /// Records a member visit.
    CheckIn,
    /// Price is typed at the register (`5x12.99`).
    CustomRate,
    /// Target of a swap modifier chain.
    SwapTarget,
    /// Unlocks the previous item's modifier classes again.
    AddMods,
    /// Any tag this build does not know about.
    #[serde(other)]
    Other,
}

impl LineFunction {
    /// Lines that only exist to drive member bookkeeping.
    pub fn is_member_management(&self) -> bool {
        matches!(self, LineFunction::AddMember | LineFunction::EditMember)
    }
}

/// How a modifier mutates the item it is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierFunction {
    /// Plain additive modifier: pushes a property.
    #[default]
    None,
    /// Prepends the modifier title to the item title.
    Prefix,
    /// Appends the modifier title to the item title.
    Suffix,
    /// Replaces title, routing and category.
    Overwrite,
    /// Replaces the item's identity, keeping the old one as a property.
    Swap,
}

impl ModifierFunction {
    /// True for the functions that rewrite the item itself.
    pub fn rewrites_item(&self) -> bool {
        !matches!(self, ModifierFunction::None)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
