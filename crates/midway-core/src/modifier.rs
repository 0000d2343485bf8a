//! # Modifier Application
//!
//! Turns "Burger" plus a chain of selected modifiers into a fully annotated
//! line item.
//!
//! ## Branches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       apply_modifier(item, modifier)                    │
//! │                                                                         │
//! │  discount?  ── percent / fixed / override ──► signed (negative) delta   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  is_modifier_mod ───► edit LAST property     "Cheese" → "Extra Cheese"  │
//! │      │ no                                                               │
//! │      ▼                                                                  │
//! │  function:                                                              │
//! │   swap       ──► new identity, old title kept as a "Mod" property       │
//! │   overwrite  ──► new title / routing / category, no history             │
//! │   prefix     ──► "Large" + " " + title   (idempotent)                   │
//! │   suffix     ──► title + " " + "Combo"   (idempotent)                   │
//! │   none       ──► push a "Mod" property                                  │
//! │                                                                         │
//! │  every branch: required ∪ optional classes of the modifier are          │
//! │  returned so the next selection step can offer them                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use midway_core::catalog::Modifier;
//! use midway_core::line_item::LineItem;
//! use midway_core::modifier::apply_modifier;
//! use midway_core::money::Money;
//! use midway_core::types::ModifierFunction;
//!
//! let mut item = LineItem::new("BURGER", "Burger", Money::from_cents(800));
//! let veggie = Modifier {
//!     title: "Veggie Burger".to_string(),
//!     price: Money::from_cents(50),
//!     function: ModifierFunction::Swap,
//!     ..Modifier::default()
//! };
//!
//! apply_modifier(&mut item, &veggie);
//! assert_eq!(item.title, "Veggie Burger");
//! assert_eq!(item.price.cents(), 850);
//! assert_eq!(item.properties[0].value, "Burger");
//! ```

use tracing::{debug, trace};

use crate::catalog::Modifier;
use crate::line_item::{LineItem, LineItemProperty, PropertyKind};
use crate::money::Money;
use crate::types::{ModClassId, ModifierFunction};

/// What an application changed beyond the item itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierOutcome {
    /// Classes selectable for the next step (as modifier-of-modifier).
    pub unlocked: Vec<ModClassId>,

    /// False when a modifier-of-modifier found no property to edit, or the
    /// property already carried the modifier's title.
    pub applied: bool,
}

/// Price delta of `modifier` on `item`, and whether discount math was used.
fn price_delta(item: &LineItem, modifier: &Modifier) -> (Money, bool) {
    match modifier
        .discount
        .and_then(|discount| discount.signed_delta(item.price))
    {
        Some(delta) => (delta, true),
        None => (modifier.price, false),
    }
}

/// Applies `modifier` to the item under modification.
///
/// The caller owns the cursor; see [`crate::cart::Cart::apply_modifier`] for
/// the guarded entry point.
pub fn apply_modifier(item: &mut LineItem, modifier: &Modifier) -> ModifierOutcome {
    let unlocked = modifier.unlocks();
    let (delta, discounted) = price_delta(item, modifier);

    let applied = if modifier.is_modifier_mod {
        apply_to_last_property(item, modifier, delta, &unlocked)
    } else if modifier.function.rewrites_item() {
        rewrite_item(item, modifier, delta, &unlocked);
        true
    } else {
        push_property(item, modifier, delta, discounted, &unlocked);
        true
    };

    trace!(
        item = %item.title,
        modifier = %modifier.title,
        delta = delta.cents(),
        applied,
        "Modifier applied"
    );

    ModifierOutcome { unlocked, applied }
}

/// Modifier of a modifier: edits the last property instead of the item.
fn apply_to_last_property(
    item: &mut LineItem,
    modifier: &Modifier,
    delta: Money,
    unlocked: &[ModClassId],
) -> bool {
    let Some(last) = item.properties.last_mut() else {
        debug!(modifier = %modifier.title, "No property to modify, skipping");
        return false;
    };

    if modifier.function == ModifierFunction::Prefix {
        if last.value.starts_with(&modifier.title) {
            return false;
        }
        last.value = format!("{} {}", modifier.title, last.value);
    } else {
        if last.value.ends_with(&modifier.title) {
            return false;
        }
        last.value = format!("{} {}", last.value, modifier.title);
    }

    last.add_price += delta;
    last.class_id = Some(modifier.class_id);
    last.kitchen.enabled = modifier.kitchen.enabled;
    last.unlocks = unlocked.to_vec();
    if modifier.category.is_some() {
        last.category = modifier.category.clone();
    }

    item.adjust_price(delta);
    true
}

/// swap / overwrite / prefix / suffix.
fn rewrite_item(item: &mut LineItem, modifier: &Modifier, delta: Money, unlocked: &[ModClassId]) {
    match modifier.function {
        ModifierFunction::Swap => {
            let mut history = LineItemProperty::new(PropertyKind::Mod, item.title.clone(), Money::zero());
            history.kitchen = item.kitchen.clone();

            item.title = modifier.title.clone();
            item.kitchen = modifier.kitchen.clone();
            item.unlocks = unlocked.to_vec();
            if modifier.category.is_some() {
                item.category = modifier.category.clone();
            }
            item.properties.push(history);
        }
        ModifierFunction::Overwrite => {
            item.title = modifier.title.clone();
            item.kitchen = modifier.kitchen.clone();
            if modifier.category.is_some() {
                item.category = modifier.category.clone();
            }
        }
        ModifierFunction::Prefix => {
            if !item.title.starts_with(&modifier.title) {
                item.title = format!("{} {}", modifier.title, item.title);
            }
            if item.category.is_none() {
                item.category = modifier.category.clone();
            }
        }
        ModifierFunction::Suffix => {
            if !item.title.ends_with(&modifier.title) {
                item.title = format!("{} {}", item.title, modifier.title);
            }
            if item.category.is_none() {
                item.category = modifier.category.clone();
            }
        }
        ModifierFunction::None => {}
    }

    item.adjust_price(delta);
    if !modifier.sku.is_empty() {
        item.sku = modifier.sku.clone();
    }
    if modifier.kitchen.station.is_some() {
        item.kitchen.station = modifier.kitchen.station.clone();
    }
    item.kitchen.enabled |= modifier.kitchen.enabled;

    // Return path: a rewrite modifier with negative quantity flips the line
    if modifier.quantity < 0 {
        item.quantity = -item.quantity;
    }
}

/// Plain additive modifier.
fn push_property(
    item: &mut LineItem,
    modifier: &Modifier,
    delta: Money,
    discounted: bool,
    unlocked: &[ModClassId],
) {
    let property = if discounted {
        LineItemProperty {
            class_id: Some(modifier.class_id),
            unlocks: unlocked.to_vec(),
            ..LineItemProperty::new(
                PropertyKind::Mod,
                format!("{} (-{})", modifier.title, delta.abs()),
                delta,
            )
        }
    } else {
        LineItemProperty {
            kind: PropertyKind::Mod,
            value: modifier.title.clone(),
            add_price: delta,
            class_id: Some(modifier.class_id),
            kitchen: modifier.kitchen.clone(),
            category: modifier.category.clone(),
            unlocks: unlocked.to_vec(),
        }
    };
    item.properties.push(property);
    item.adjust_price(delta);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModifierDiscount;
    use crate::types::{KitchenRouting, Rate};

    fn burger() -> LineItem {
        let mut item = LineItem::new("FOOD-BURGER", "Burger", Money::from_cents(800));
        item.kitchen = KitchenRouting::station("grill");
        item.category = Some("food".to_string());
        item
    }

    fn modifier(title: &str, cents: i64, function: ModifierFunction) -> Modifier {
        Modifier {
            sku: format!("MOD-{}", title.to_uppercase().replace(' ', "-")),
            title: title.to_string(),
            price: Money::from_cents(cents),
            class_id: 12,
            function,
            ..Modifier::default()
        }
    }

    #[test]
    fn test_swap_keeps_old_identity() {
        let mut item = burger();
        let mut veggie = modifier("Veggie Burger", 50, ModifierFunction::Swap);
        veggie.kitchen = KitchenRouting::station("veg");
        veggie.optional_mods = vec![40];

        let outcome = apply_modifier(&mut item, &veggie);

        assert_eq!(item.title, "Veggie Burger");
        assert_eq!(item.price.cents(), 850);
        assert_eq!(item.full_price.cents(), 850);
        assert_eq!(item.sku, "MOD-VEGGIE-BURGER");
        assert_eq!(item.kitchen.station.as_deref(), Some("veg"));
        assert_eq!(item.unlocks, vec![40]);
        assert_eq!(item.properties.len(), 1);
        assert_eq!(item.properties[0].kind, PropertyKind::Mod);
        assert_eq!(item.properties[0].value, "Burger");
        assert_eq!(item.properties[0].kitchen.station.as_deref(), Some("grill"));
        assert_eq!(outcome.unlocked, vec![40]);
    }

    #[test]
    fn test_overwrite_leaves_no_history() {
        let mut item = burger();
        apply_modifier(&mut item, &modifier("Chicken Sandwich", 100, ModifierFunction::Overwrite));
        assert_eq!(item.title, "Chicken Sandwich");
        assert_eq!(item.price.cents(), 900);
        assert!(item.properties.is_empty());
        // Overwrite replaces routing with the modifier's (disabled) routing
        assert!(!item.kitchen.enabled);
    }

    #[test]
    fn test_prefix_and_suffix_are_idempotent() {
        let mut item = burger();
        let large = modifier("Large", 200, ModifierFunction::Prefix);
        apply_modifier(&mut item, &large);
        apply_modifier(&mut item, &large);
        assert_eq!(item.title, "Large Burger");

        let combo = modifier("Combo", 300, ModifierFunction::Suffix);
        apply_modifier(&mut item, &combo);
        apply_modifier(&mut item, &combo);
        assert_eq!(item.title, "Large Burger Combo");
        // Price still accumulates on every application
        assert_eq!(item.price.cents(), 800 + 200 * 2 + 300 * 2);
    }

    #[test]
    fn test_prefix_backfills_missing_category() {
        let mut item = LineItem::new("TICKET", "Ride Ticket", Money::from_cents(500));
        let mut vip = modifier("VIP", 0, ModifierFunction::Prefix);
        vip.category = Some("rides".to_string());
        apply_modifier(&mut item, &vip);
        assert_eq!(item.category.as_deref(), Some("rides"));
    }

    #[test]
    fn test_negative_quantity_rewrite_flips_line() {
        let mut item = burger();
        item.quantity = 2;
        let mut refund = modifier("Refund", 0, ModifierFunction::Overwrite);
        refund.quantity = -1;
        apply_modifier(&mut item, &refund);
        assert_eq!(item.quantity, -2);
    }

    #[test]
    fn test_plain_modifier_pushes_property() {
        let mut item = burger();
        let mut cheese = modifier("Cheese", 75, ModifierFunction::None);
        cheese.kitchen = KitchenRouting::station("grill");
        apply_modifier(&mut item, &cheese);

        assert_eq!(item.price.cents(), 875);
        let prop = &item.properties[0];
        assert_eq!(prop.value, "Cheese");
        assert_eq!(prop.add_price.cents(), 75);
        assert_eq!(prop.class_id, Some(12));
        assert!(prop.kitchen.enabled);
    }

    #[test]
    fn test_percent_discount_modifier() {
        let mut item = burger();
        let mut staff = modifier("Staff", 0, ModifierFunction::None);
        staff.discount = Some(ModifierDiscount::Percent(Rate::from_bps(2500)));
        staff.kitchen = KitchenRouting::station("grill");
        apply_modifier(&mut item, &staff);

        assert_eq!(item.price.cents(), 600);
        let prop = &item.properties[0];
        assert_eq!(prop.value, "Staff (-$2.00)");
        assert_eq!(prop.add_price.cents(), -200);
        assert!(!prop.kitchen.enabled);
    }

    #[test]
    fn test_override_price_modifier() {
        let mut item = burger();
        let mut promo = modifier("Promo", 0, ModifierFunction::None);
        promo.discount = Some(ModifierDiscount::OverridePrice(Money::from_cents(500)));
        apply_modifier(&mut item, &promo);
        assert_eq!(item.price.cents(), 500);
        assert_eq!(item.properties[0].value, "Promo (-$3.00)");
    }

    #[test]
    fn test_unknown_discount_is_plain_additive() {
        let mut item = burger();
        let mut odd = modifier("Odd", 25, ModifierFunction::None);
        odd.discount = Some(ModifierDiscount::Unknown);
        apply_modifier(&mut item, &odd);
        assert_eq!(item.price.cents(), 825);
        assert_eq!(item.properties[0].value, "Odd");
    }

    #[test]
    fn test_modifier_mod_edits_last_property() {
        let mut item = burger();
        apply_modifier(&mut item, &modifier("Cheese", 75, ModifierFunction::None));

        let mut extra = modifier("Extra", 50, ModifierFunction::Prefix);
        extra.is_modifier_mod = true;
        extra.class_id = 40;
        let outcome = apply_modifier(&mut item, &extra);
        assert!(outcome.applied);

        let mut melted = modifier("Melted", 0, ModifierFunction::None);
        melted.is_modifier_mod = true;
        apply_modifier(&mut item, &melted);

        assert_eq!(item.properties.len(), 1);
        assert_eq!(item.properties[0].value, "Extra Cheese Melted");
        assert_eq!(item.properties[0].add_price.cents(), 125);
        assert_eq!(item.price.cents(), 925);

        // Prefix again is a no-op
        let outcome = apply_modifier(&mut item, &extra);
        assert!(!outcome.applied);
        assert_eq!(item.price.cents(), 925);
    }

    #[test]
    fn test_modifier_mod_without_property_is_noop() {
        let mut item = burger();
        let mut extra = modifier("Extra", 50, ModifierFunction::Prefix);
        extra.is_modifier_mod = true;
        let outcome = apply_modifier(&mut item, &extra);
        assert!(!outcome.applied);
        assert_eq!(item.price.cents(), 800);
        assert!(item.properties.is_empty());
    }
}
