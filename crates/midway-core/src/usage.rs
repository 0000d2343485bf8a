//! # Usage Constraints & Modifier Board
//!
//! Decides which modifiers the register offers next, and where on the
//! button grid they land.
//!
//! ## Filter Rules
//! ```text
//! candidate.max_quantity   count properties whose value contains the title
//!                          exclude if count >= max_quantity × |item.qty|
//!
//! candidate.max_mod_class  count properties from the same class
//!                          exclude if count >= max_mod_class × |item.qty|
//!
//! candidate.scope_class    (parent-scope candidates only)
//!                          exclude if scope != wildcard and
//!                          scope / 1000 != class being built
//! ```
//!
//! ## Board Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base slots (class modifiers sorted by SKU, or the tab's grid)          │
//! │  [Cheese][  ][Onion][  ][  ][  ]                                        │
//! │            ▲         ▲   ▲                                              │
//! │            │         │   └─ blanks filled forward by parent, then       │
//! │            │         │      same-level candidates                       │
//! │            └─────────┴───── ...and backward from the end by             │
//! │                             modifier-of-modifier candidates             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::trace;

use crate::catalog::Modifier;
use crate::config::PricingConfig;
use crate::line_item::LineItem;
use crate::types::{parent_group, ModClassId};

// =============================================================================
// Filter
// =============================================================================

fn usage_limit(per_unit: u32, target: &LineItem) -> i64 {
    per_unit as i64 * target.quantity.abs()
}

fn exceeds_usage(candidate: &Modifier, target: &LineItem) -> bool {
    if let Some(max) = candidate.max_quantity.filter(|max| *max > 0) {
        let used = target
            .properties
            .iter()
            .filter(|prop| prop.value.contains(&candidate.title))
            .count() as i64;
        if used >= usage_limit(max, target) {
            return true;
        }
    }

    if let Some(max) = candidate.max_mod_class.filter(|max| *max > 0) {
        let used = target
            .properties
            .iter()
            .filter(|prop| prop.class_id == Some(candidate.class_id))
            .count() as i64;
        if used >= usage_limit(max, target) {
            return true;
        }
    }

    false
}

fn out_of_scope(candidate: &Modifier, current_class: ModClassId, config: &PricingConfig) -> bool {
    match candidate.scope_class {
        Some(scope) if scope != 0 && scope != config.wildcard_class => {
            parent_group(scope) != current_class
        }
        _ => false,
    }
}

/// Removes candidates that hit a usage cap on `target`.
///
/// `scope` is the class currently being built; pass it for parent-scope
/// candidates to apply the composite-class rule. Without a target only the
/// scope rule can exclude anything.
pub fn filter_available(
    candidates: Vec<Modifier>,
    target: Option<&LineItem>,
    scope: Option<ModClassId>,
    config: &PricingConfig,
) -> Vec<Modifier> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let capped = target.is_some_and(|item| exceeds_usage(candidate, item));
            let scoped_out = scope.is_some_and(|class| out_of_scope(candidate, class, config));
            if capped || scoped_out {
                trace!(
                    modifier = %candidate.title,
                    capped,
                    scoped_out,
                    "Modifier excluded"
                );
            }
            !capped && !scoped_out
        })
        .collect()
}

// =============================================================================
// Board Assembly
// =============================================================================

/// Fills blank slots of `slots` with `fill`, in order.
///
/// Scans forward from the start, or backward from the end when `reverse`.
/// Leftover fill entries are dropped; slots never grow.
pub fn merge_into_blanks(mut slots: Vec<Modifier>, fill: Vec<Modifier>, reverse: bool) -> Vec<Modifier> {
    let mut fill = fill.into_iter();
    let mut next = fill.next();

    let indices: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..slots.len()).rev())
    } else {
        Box::new(0..slots.len())
    };

    for index in indices {
        let Some(candidate) = next.take() else {
            break;
        };
        if slots[index].is_blank() {
            slots[index] = candidate;
            next = fill.next();
        } else {
            next = Some(candidate);
        }
    }
    slots
}

/// Candidate groups for one button board.
#[derive(Debug, Clone, Default)]
pub struct BoardParts {
    /// Base slots; blanks are empty titles.
    pub base: Vec<Modifier>,
    /// Parent-scope candidates (already filtered).
    pub parent: Vec<Modifier>,
    /// Same-level candidates unlocked by the item (already filtered).
    pub same_level: Vec<Modifier>,
    /// Modifier-of-modifier candidates.
    pub modifier_mods: Vec<Modifier>,
}

impl BoardParts {
    /// Lays the groups out on the base slots.
    pub fn assemble(self) -> Vec<Modifier> {
        let board = merge_into_blanks(self.base, self.parent, false);
        let board = merge_into_blanks(board, self.same_level, false);
        merge_into_blanks(board, self.modifier_mods, true)
    }
}

/// Sorts class modifiers by SKU for use as base slots.
pub fn sort_by_sku(mut modifiers: Vec<Modifier>) -> Vec<Modifier> {
    modifiers.sort_by(|a, b| a.sku.cmp(&b.sku));
    modifiers
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{LineItemProperty, PropertyKind};
    use crate::money::Money;

    fn candidate(title: &str, class_id: ModClassId) -> Modifier {
        Modifier {
            sku: format!("MOD-{}", title),
            title: title.to_string(),
            class_id,
            ..Modifier::default()
        }
    }

    fn blank() -> Modifier {
        Modifier::default()
    }

    fn item_with(values: &[(&str, ModClassId)], quantity: i64) -> LineItem {
        let mut item = LineItem::new("FOOD-BURGER", "Burger", Money::from_cents(800));
        item.quantity = quantity;
        for (value, class) in values {
            let mut prop = LineItemProperty::new(PropertyKind::Mod, *value, Money::zero());
            prop.class_id = Some(*class);
            item.properties.push(prop);
        }
        item
    }

    fn titles(board: &[Modifier]) -> Vec<&str> {
        board.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_max_quantity_scaled_by_item_quantity() {
        let mut bacon = candidate("Bacon", 12);
        bacon.max_quantity = Some(1);

        let item = item_with(&[("Bacon", 12)], 1);
        let config = PricingConfig::default();
        assert!(filter_available(vec![bacon.clone()], Some(&item), None, &config).is_empty());

        // Two burgers on the line allow two bacons
        let item = item_with(&[("Extra Bacon", 12)], -2);
        assert_eq!(filter_available(vec![bacon], Some(&item), None, &config).len(), 1);
    }

    #[test]
    fn test_max_mod_class_counts_same_class() {
        let mut onion = candidate("Onion", 12);
        onion.max_mod_class = Some(2);
        let config = PricingConfig::default();

        let item = item_with(&[("Cheese", 12), ("Pickles", 30), ("Tomato", 12)], 1);
        assert!(filter_available(vec![onion.clone()], Some(&item), None, &config).is_empty());

        let item = item_with(&[("Cheese", 12)], 1);
        assert_eq!(filter_available(vec![onion], Some(&item), None, &config).len(), 1);
    }

    #[test]
    fn test_scope_rule_with_wildcard() {
        let config = PricingConfig::default();
        let mut in_scope = candidate("Ketchup", 5);
        in_scope.scope_class = Some(12_003);
        let mut other_scope = candidate("Syrup", 5);
        other_scope.scope_class = Some(14_001);
        let mut wildcard = candidate("Napkins", 5);
        wildcard.scope_class = Some(255_000);

        let kept = filter_available(vec![in_scope, other_scope, wildcard], None, Some(12), &config);
        assert_eq!(titles(&kept), vec!["Ketchup", "Napkins"]);
    }

    #[test]
    fn test_merge_into_blanks_forward_and_reverse() {
        let slots = vec![candidate("A", 1), blank(), candidate("B", 1), blank(), blank()];
        let merged = merge_into_blanks(slots.clone(), vec![candidate("P1", 2), candidate("P2", 2)], false);
        assert_eq!(titles(&merged), vec!["A", "P1", "B", "P2", ""]);

        let merged = merge_into_blanks(slots, vec![candidate("M1", 3), candidate("M2", 3)], true);
        assert_eq!(titles(&merged), vec!["A", "", "B", "M2", "M1"]);
    }

    #[test]
    fn test_board_assembly_order() {
        let parts = BoardParts {
            base: vec![blank(), candidate("Cheese", 12), blank(), blank(), blank()],
            parent: vec![candidate("Parent", 1)],
            same_level: vec![candidate("Sauce", 13)],
            modifier_mods: vec![candidate("Extra", 40), candidate("Light", 40), candidate("Dropped", 40)],
        };
        let board = parts.assemble();
        assert_eq!(titles(&board), vec!["Parent", "Cheese", "Sauce", "Light", "Extra"]);
    }

    #[test]
    fn test_sort_by_sku() {
        let sorted = sort_by_sku(vec![candidate("Onion", 1), candidate("Bacon", 1)]);
        assert_eq!(titles(&sorted), vec!["Bacon", "Onion"]);
    }
}
