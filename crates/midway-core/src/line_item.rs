//! # Line Items
//!
//! A [`LineItem`] is one row of the cart: a frozen copy of a catalog button,
//! the modifiers attached to it as an ordered list of [`LineItemProperty`]
//! annotations, and (after recomputation) its tax lines.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogButton ──► LineItem::from_button()                              │
//! │                         │                                               │
//! │                         ▼                                               │
//! │              cursor item: apply_modifier() × N   (mutable)              │
//! │                         │                                               │
//! │                         ▼  cursor moves on                              │
//! │              frozen in Cart.items                                       │
//! │                         │                                               │
//! │                         ▼  every read                                   │
//! │              cloned into net() → compute_order()                        │
//! │              (RETURN / discount properties, tax_lines)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The recomputation never writes back into the cart: it works on copies,
//! so the annotations it adds are rebuilt from scratch every time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::CatalogButton;
use crate::money::Money;
use crate::types::{KitchenRouting, LineFunction, ModClassId, Rate};

fn default_true() -> bool {
    true
}

fn default_quantity() -> i64 {
    1
}

// =============================================================================
// Properties
// =============================================================================

/// What produced a property. Wire names match the commerce platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PropertyKind {
    /// An applied modifier, or the old identity kept by a swap.
    #[serde(rename = "Mod")]
    Mod,
    /// A return netted against this line.
    #[serde(rename = "RETURN")]
    Return,
    /// A cart-level discount applied by the recomputation.
    #[serde(rename = "discount")]
    Discount,
    /// A discount allocation recorded on a stored order.
    #[serde(rename = "Discount")]
    StoredDiscount,
}

/// An ordered annotation on a line item.
///
/// A property can itself be modified ("modifier of a modifier"); `unlocks`
/// lists the classes that become selectable for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemProperty {
    #[serde(rename = "name")]
    pub kind: PropertyKind,

    /// Display value, e.g. `"Cheese"` or `"$0.33 Off Each"`.
    pub value: String,

    /// Signed unit price delta this property contributed.
    #[serde(default)]
    pub add_price: Money,

    /// Modifier class that produced the property.
    #[serde(default)]
    pub class_id: Option<ModClassId>,

    #[serde(default)]
    pub kitchen: KitchenRouting,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub unlocks: Vec<ModClassId>,
}

impl LineItemProperty {
    /// A bare annotation with no routing or class.
    pub fn new(kind: PropertyKind, value: impl Into<String>, add_price: Money) -> Self {
        LineItemProperty {
            kind,
            value: value.into(),
            add_price,
            class_id: None,
            kitchen: KitchenRouting::disabled(),
            category: None,
            unlocks: Vec::new(),
        }
    }

    /// True if the category contains `needle` (substring match).
    pub fn category_contains(&self, needle: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|category| category.contains(needle))
    }
}

// =============================================================================
// Tax Line
// =============================================================================

/// Tax charged on one line (or, on the order, on all lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLine {
    pub title: String,
    pub rate: Rate,
    pub price: Money,
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of the cart.
///
/// ## Prices
/// - `price`: current unit price, moved by modifiers, netting and discounts
/// - `full_price`: unit price before cart-level discounts; the basis for
///   splitting fixed-amount codes
///
/// A negative `quantity` is a return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Cart line identity; split parts of one line share it.
    pub id: String,

    #[serde(default)]
    pub sku: String,

    pub title: String,

    pub price: Money,

    pub full_price: Money,

    #[serde(default = "default_quantity")]
    pub quantity: i64,

    #[serde(default)]
    pub properties: Vec<LineItemProperty>,

    #[serde(default = "default_true")]
    pub taxable: bool,

    #[serde(default)]
    pub kitchen: KitchenRouting,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub function: Option<LineFunction>,

    #[serde(default)]
    pub no_discounts: bool,

    /// Modifier classes this line currently unlocks.
    #[serde(default)]
    pub unlocks: Vec<ModClassId>,

    #[serde(default)]
    pub max_quantity: Option<i64>,

    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,

    /// Discount amounts recorded by the commerce platform (stored orders).
    #[serde(default)]
    pub discount_allocations: Vec<Money>,
}

impl LineItem {
    /// Creates a single-unit line with a fresh id.
    pub fn new(sku: impl Into<String>, title: impl Into<String>, price: Money) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            sku: sku.into(),
            title: title.into(),
            price,
            full_price: price,
            quantity: 1,
            properties: Vec::new(),
            taxable: true,
            kitchen: KitchenRouting::disabled(),
            category: None,
            vendor: None,
            function: None,
            no_discounts: false,
            unlocks: Vec::new(),
            max_quantity: None,
            tax_lines: Vec::new(),
            discount_allocations: Vec::new(),
        }
    }

    /// Takes a frozen copy of a catalog button.
    pub fn from_button(button: &CatalogButton) -> Self {
        LineItem {
            category: button.category.clone(),
            vendor: button.vendor.clone(),
            taxable: button.taxable,
            no_discounts: button.no_discounts,
            kitchen: button.kitchen.clone(),
            function: button.function,
            unlocks: button.unlocks(),
            max_quantity: button.max_quantity,
            ..LineItem::new(button.sku.clone(), button.title.clone(), button.price)
        }
    }

    /// `price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// `full_price × quantity`.
    #[inline]
    pub fn full_total(&self) -> Money {
        self.full_price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_return(&self) -> bool {
        self.quantity < 0
    }

    /// Moves the unit price and keeps `full_price` in step (pre-discount
    /// adjustments only).
    pub fn adjust_price(&mut self, delta: Money) {
        self.price += delta;
        self.full_price = self.price;
    }

    /// True if the category contains `needle` (substring match).
    pub fn category_contains(&self, needle: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|category| category.contains(needle))
    }

    /// True if this line matches `name` by vendor or category.
    pub fn matches_category(&self, name: &str) -> bool {
        self.vendor.as_deref() == Some(name) || self.category.as_deref() == Some(name)
    }

    /// Identical in everything except id and quantity.
    pub fn is_same_line(&self, other: &LineItem) -> bool {
        self.sku == other.sku
            && self.title == other.title
            && self.price == other.price
            && self.full_price == other.full_price
            && self.properties == other.properties
            && self.taxable == other.taxable
            && self.kitchen == other.kitchen
            && self.category == other.category
            && self.vendor == other.vendor
            && self.function == other.function
            && self.no_discounts == other.no_discounts
            && self.unlocks == other.unlocks
            && self.max_quantity == other.max_quantity
    }

    /// Copy of this line with a different quantity and unit price.
    ///
    /// Used when a line has to be split so every cent lands somewhere.
    pub fn split_part(&self, quantity: i64, price: Money) -> LineItem {
        LineItem {
            quantity,
            price,
            ..self.clone()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
