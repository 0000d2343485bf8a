//! # Catalog Records
//!
//! What the register can sell ([`CatalogButton`]) and how an item can be
//! modified ([`Modifier`]), plus the boundary to the modifier catalog cache.
//!
//! ## Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog service (external, async, batched)                             │
//! │        │  class id ──► [Modifier]                                       │
//! │        ▼                                                                │
//! │  CatalogCache  (this module: in-memory, read-only to the engine)        │
//! │        │                                                                │
//! │        ├── resolve(classes)     missing class → empty list              │
//! │        ├── unresolved(classes)  what the caller still has to fetch      │
//! │        └── surface_unlocked()   nested classes tagged as modifier-mods  │
//! │        ▼                                                                │
//! │  Modifier application / usage filter                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All fetching happens before data reaches the engine; nothing here blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{union_classes, KitchenRouting, LineFunction, ModClassId, ModifierFunction, Rate};

fn default_true() -> bool {
    true
}

fn default_quantity() -> i64 {
    1
}

// =============================================================================
// Catalog Button
// =============================================================================

/// A purchasable button on the register grid.
///
/// Immutable once fetched; a [`crate::line_item::LineItem`] takes a frozen
/// copy of the fields it needs when the button is pressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogButton {
    #[serde(default)]
    pub sku: String,

    pub title: String,

    /// Unit price ("full price") in cents. Negative prices are return buttons.
    #[serde(default)]
    pub price: Money,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default = "default_true")]
    pub taxable: bool,

    /// Excludes the line from percentage and fixed discounts.
    #[serde(default)]
    pub no_discounts: bool,

    #[serde(default)]
    pub kitchen: KitchenRouting,

    /// Per-line quantity cap.
    #[serde(default)]
    pub max_quantity: Option<i64>,

    #[serde(default)]
    pub required_mods: Vec<ModClassId>,

    #[serde(default)]
    pub optional_mods: Vec<ModClassId>,

    #[serde(default)]
    pub function: Option<LineFunction>,

    /// Composite class (`parent_group * 1000 + sub_class`) whose modifiers
    /// are offered after this button is pressed.
    #[serde(default)]
    pub mod_class: Option<ModClassId>,
}

impl CatalogButton {
    /// Modifier classes this button unlocks.
    pub fn unlocks(&self) -> Vec<ModClassId> {
        union_classes(&self.required_mods, &self.optional_mods)
    }
}

// =============================================================================
// Modifier
// =============================================================================

/// Discount behavior carried by a modifier.
///
/// ```json
/// {"type": "percent", "value": 1000}        // 10% of the item price
/// {"type": "fixed", "value": 150}           // $1.50 off
/// {"type": "override_price", "value": 500}  // item now costs $5.00
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModifierDiscount {
    Percent(Rate),
    Fixed(Money),
    OverridePrice(Money),
    /// Unrecognized discount type; the modifier behaves as plain additive.
    #[serde(other)]
    Unknown,
}

impl ModifierDiscount {
    /// Signed price delta this discount contributes to an item priced at
    /// `item_price`. Discounts are negative; `None` for unknown types.
    ///
    /// ```rust
    /// use midway_core::catalog::ModifierDiscount;
    /// use midway_core::money::Money;
    /// use midway_core::types::Rate;
    ///
    /// let price = Money::from_cents(1200);
    /// assert_eq!(
    ///     ModifierDiscount::Percent(Rate::from_bps(2500)).signed_delta(price),
    ///     Some(Money::from_cents(-300))
    /// );
    /// assert_eq!(
    ///     ModifierDiscount::OverridePrice(Money::from_cents(1000)).signed_delta(price),
    ///     Some(Money::from_cents(-200))
    /// );
    /// ```
    pub fn signed_delta(&self, item_price: Money) -> Option<Money> {
        let amount = match self {
            ModifierDiscount::Percent(rate) => item_price.percentage(*rate),
            ModifierDiscount::Fixed(amount) => *amount,
            ModifierDiscount::OverridePrice(target) => item_price - *target,
            ModifierDiscount::Unknown => return None,
        };
        Some(-amount)
    }
}

/// A selectable entry of a modifier class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(default)]
    pub sku: String,

    /// Empty titles are blank grid slots.
    #[serde(default)]
    pub title: String,

    /// Price delta in cents.
    #[serde(default)]
    pub price: Money,

    /// The class this modifier belongs to.
    #[serde(default)]
    pub class_id: ModClassId,

    #[serde(default)]
    pub function: ModifierFunction,

    #[serde(default)]
    pub discount: Option<ModifierDiscount>,

    /// Max uses per unit of the target item (matched by title).
    #[serde(default)]
    pub max_quantity: Option<u32>,

    /// Max uses of this modifier's class per unit of the target item.
    #[serde(default)]
    pub max_mod_class: Option<u32>,

    /// Composite scope (`parent_group * 1000 + sub_class`); the modifier is
    /// offered from a parent class only while its group is being built.
    #[serde(default)]
    pub scope_class: Option<ModClassId>,

    /// Applies to the last property of the item instead of the item.
    #[serde(default)]
    pub is_modifier_mod: bool,

    #[serde(default)]
    pub required_mods: Vec<ModClassId>,

    #[serde(default)]
    pub optional_mods: Vec<ModClassId>,

    #[serde(default)]
    pub kitchen: KitchenRouting,

    #[serde(default)]
    pub category: Option<String>,

    /// Negative on rewrite modifiers that turn the item into a return.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl Modifier {
    /// Modifier classes this modifier unlocks for the next selection step.
    pub fn unlocks(&self) -> Vec<ModClassId> {
        union_classes(&self.required_mods, &self.optional_mods)
    }

    /// True for a blank grid slot.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
    }
}

// =============================================================================
// Catalog Cache
// =============================================================================

/// Read access to modifier definitions by class.
pub trait ModifierCatalog {
    /// Returns the modifiers of `class`, or `None` if the class has not been
    /// fetched yet. A fetched class may legitimately be empty.
    fn lookup(&self, class: ModClassId) -> Option<&[Modifier]>;

    /// Clones the modifiers of every class in order; unknown classes
    /// contribute nothing.
    fn resolve(&self, classes: &[ModClassId]) -> Vec<Modifier> {
        classes
            .iter()
            .filter_map(|class| self.lookup(*class))
            .flat_map(|mods| mods.iter().cloned())
            .collect()
    }

    /// Classes from `classes` that still have to be fetched.
    fn unresolved(&self, classes: &[ModClassId]) -> Vec<ModClassId> {
        let mut missing = Vec::new();
        for class in classes {
            if self.lookup(*class).is_none() && !missing.contains(class) {
                missing.push(*class);
            }
        }
        missing
    }
}

/// Resolves classes unlocked by an applied modifier and tags every result
/// as a modifier-of-modifier candidate.
pub fn surface_unlocked<C: ModifierCatalog + ?Sized>(
    catalog: &C,
    classes: &[ModClassId],
) -> Vec<Modifier> {
    catalog
        .resolve(classes)
        .into_iter()
        .map(|mut modifier| {
            modifier.is_modifier_mod = true;
            modifier
        })
        .collect()
}

/// In-memory modifier catalog, filled by the caller from batched fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogCache {
    classes: BTreeMap<ModClassId, Vec<Modifier>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) one class.
    pub fn insert_class(&mut self, class: ModClassId, modifiers: Vec<Modifier>) {
        self.classes.insert(class, modifiers);
    }

    /// Merges a batched fetch result.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = (ModClassId, Vec<Modifier>)>) {
        for (class, modifiers) in batch {
            self.insert_class(class, modifiers);
        }
    }

    /// Nested classes referenced by cached modifiers but not cached yet.
    ///
    /// The caller fetches these and calls [`CatalogCache::extend`] until the
    /// list is empty; a class that fails to fetch can be cached as empty.
    pub fn nested_unresolved(&self) -> Vec<ModClassId> {
        let referenced: Vec<ModClassId> = self
            .classes
            .values()
            .flatten()
            .flat_map(|modifier| modifier.unlocks())
            .collect();
        let mut missing = self.unresolved(&referenced);
        missing.sort_unstable();
        missing
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ModifierCatalog for CatalogCache {
    fn lookup(&self, class: ModClassId) -> Option<&[Modifier]> {
        self.classes.get(&class).map(Vec::as_slice)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn topping(title: &str, class_id: ModClassId) -> Modifier {
        Modifier {
            sku: format!("MOD-{}", title),
            title: title.to_string(),
            price: Money::from_cents(50),
            class_id,
            ..Modifier::default()
        }
    }

    #[test]
    fn test_modifier_deserialize_defaults() {
        let modifier: Modifier = serde_json::from_str(r#"{"title": "Bacon", "price": 150}"#).unwrap();
        assert_eq!(modifier.quantity, 1);
        assert_eq!(modifier.function, ModifierFunction::None);
        assert!(modifier.discount.is_none());
        assert!(!modifier.is_modifier_mod);
    }

    #[test]
    fn test_modifier_discount_wire_format() {
        let modifier: Modifier = serde_json::from_str(
            r#"{"title": "Staff", "discount": {"type": "percent", "value": 5000}}"#,
        )
        .unwrap();
        assert_eq!(
            modifier.discount,
            Some(ModifierDiscount::Percent(Rate::from_bps(5000)))
        );

        let modifier: Modifier =
            serde_json::from_str(r#"{"title": "Odd", "discount": {"type": "bogo"}}"#).unwrap();
        assert_eq!(modifier.discount, Some(ModifierDiscount::Unknown));
        assert!(ModifierDiscount::Unknown.signed_delta(Money::from_cents(100)).is_none());
    }

    #[test]
    fn test_fixed_discount_delta_is_negative() {
        let delta = ModifierDiscount::Fixed(Money::from_cents(150)).signed_delta(Money::from_cents(900));
        assert_eq!(delta, Some(Money::from_cents(-150)));
    }

    #[test]
    fn test_resolve_treats_missing_as_empty() {
        let mut cache = CatalogCache::new();
        cache.insert_class(10, vec![topping("Cheese", 10), topping("Onion", 10)]);
        cache.insert_class(11, Vec::new());

        let resolved = cache.resolve(&[10, 11, 99]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(cache.unresolved(&[10, 11, 99, 99]), vec![99]);
    }

    #[test]
    fn test_nested_unresolved_lists_missing_classes() {
        let mut cheese = topping("Cheese", 10);
        cheese.optional_mods = vec![20, 21];
        let mut cache = CatalogCache::new();
        cache.extend([(10, vec![cheese]), (21, Vec::new())]);

        assert_eq!(cache.nested_unresolved(), vec![20]);
    }

    #[test]
    fn test_surface_unlocked_tags_modifier_mods() {
        let mut cache = CatalogCache::new();
        cache.insert_class(20, vec![topping("Extra", 20)]);

        let surfaced = surface_unlocked(&cache, &[20]);
        assert_eq!(surfaced.len(), 1);
        assert!(surfaced[0].is_modifier_mod);
    }
}
