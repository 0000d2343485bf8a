//! # Cart State
//!
//! The in-progress order: its lines, the cursor on the line being modified,
//! the active discount codes and the tax-exempt flag. This is the only
//! stateful piece; everything it reports goes through [`Cart::recompute`].
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action          Cart Method             State Change          │
//! │  ───────────────          ───────────             ────────────          │
//! │                                                                         │
//! │  Tap item button ───────► add_button() ─────────► push or merge line,  │
//! │                                                   cursor → that line    │
//! │                                                                         │
//! │  Tap modifier ──────────► apply_modifier() ─────► items[cursor] edited │
//! │                                                                         │
//! │  Show grid ─────────────► available_modifiers() ► (read only)          │
//! │                                                                         │
//! │  Enter code ────────────► add_discount_code() ──► codes.push(code)     │
//! │                                                                         │
//! │  Any read ──────────────► recompute() ──────────► (pure, from scratch) │
//! │                                                                         │
//! │  NOTE: exactly one mutator and one cursor; no locking inside the core. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{surface_unlocked, CatalogButton, Modifier, ModifierCatalog};
use crate::config::PricingConfig;
use crate::discount::DiscountCode;
use crate::error::{CoreError, CoreResult};
use crate::line_item::LineItem;
use crate::modifier::{apply_modifier, ModifierOutcome};
use crate::money::Money;
use crate::order::OrderSubmission;
use crate::pricing::{recompute, ComputedOrder};
use crate::types::{parent_group, sub_class, union_classes, LineFunction, ModClassId, ModifierFunction};
use crate::usage::{filter_available, sort_by_sku, BoardParts};
use crate::validation::{
    validate_cart_size, validate_discount_code, validate_line_item, validate_price_cents, validate_quantity,
};
use crate::MAX_ITEM_QUANTITY;

/// Typed entries this large (either sign) are treated as a mistyped barcode.
const QUANTITY_ENTRY_LIMIT: i64 = 10_000;

/// Custom-rate quantities this large (either sign) fall back to 1.
const CUSTOM_RATE_QUANTITY_LIMIT: i64 = 100_000;

// =============================================================================
// Quantity Entry
// =============================================================================

/// What the cashier typed before tapping a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantityEntry {
    /// `"5"`, `"-2"`
    Quantity { quantity: i64 },
    /// `"300*2299"` (cents) or `"5x12.99"` (dollars)
    CustomRate { quantity: i64, rate: Money },
}

impl QuantityEntry {
    /// Parses typed register input.
    ///
    /// `custom_rate` enables the `quantity*rate` form for items that take a
    /// typed price. Empty input is `Ok(None)`.
    ///
    /// ```rust
    /// use midway_core::cart::QuantityEntry;
    /// use midway_core::money::Money;
    ///
    /// assert_eq!(
    ///     QuantityEntry::parse("5x12.99", true).unwrap(),
    ///     Some(QuantityEntry::CustomRate { quantity: 5, rate: Money::from_cents(1299) })
    /// );
    /// assert_eq!(
    ///     QuantityEntry::parse("300*2299", true).unwrap(),
    ///     Some(QuantityEntry::CustomRate { quantity: 300, rate: Money::from_cents(2299) })
    /// );
    /// assert_eq!(
    ///     QuantityEntry::parse("12345", false).unwrap(),
    ///     Some(QuantityEntry::Quantity { quantity: 1 })
    /// );
    /// ```
    pub fn parse(input: &str, custom_rate: bool) -> CoreResult<Option<Self>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        let invalid = || CoreError::InvalidEntry(input.to_string());

        if custom_rate {
            if let Some((qty, rate)) = input.split_once(['*', 'x']) {
                let quantity = parse_integer(qty).ok_or_else(invalid)?;
                let quantity = if quantity.unsigned_abs() >= CUSTOM_RATE_QUANTITY_LIMIT.unsigned_abs() {
                    1
                } else {
                    quantity
                };

                if rate.is_empty() || rate.starts_with('-') {
                    return Err(invalid());
                }
                let rate = if rate.contains('.') {
                    Money::parse_decimal(rate).map_err(|_| invalid())?
                } else {
                    Money::from_cents(parse_integer(rate).ok_or_else(invalid)?)
                };
                return Ok(Some(QuantityEntry::CustomRate { quantity, rate }));
            }
        }

        let quantity = parse_integer(input).ok_or_else(invalid)?;
        let quantity = if quantity.unsigned_abs() >= QUANTITY_ENTRY_LIMIT.unsigned_abs() {
            1
        } else {
            quantity
        };
        Ok(Some(QuantityEntry::Quantity { quantity }))
    }
}

/// `-?\d+` only.
fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// =============================================================================
// Selection Context
// =============================================================================

/// Which modifier classes the register is offering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    /// Class being built right now (sub-class part of a composite).
    pub current_class: Option<ModClassId>,
    /// Composite class whose modifiers are offered as the parent scope.
    pub parent_class: Option<ModClassId>,
    /// Classes unlocked by the line under modification.
    pub item_classes: Vec<ModClassId>,
    /// Classes unlocked by the last applied modifier.
    pub modifier_mod_classes: Vec<ModClassId>,
}

impl SelectionContext {
    /// Points the context at a composite class.
    fn enter_class(&mut self, composite: ModClassId, is_parent: bool) {
        let sub = sub_class(composite);
        self.current_class = (sub != 0).then_some(sub);
        if sub == 0 {
            self.parent_class = None;
        }
        if is_parent {
            self.parent_class = (composite != 0).then_some(composite);
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - `cursor`, when set, indexes into `items`
/// - at most MAX_CART_ITEMS lines, |quantity| ≤ MAX_ITEM_QUANTITY per line
/// - discount codes are unique by code string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Line currently being modified.
    #[serde(default)]
    pub cursor: Option<usize>,

    #[serde(default)]
    pub discount_codes: Vec<DiscountCode>,

    #[serde(default)]
    pub tax_exempt: bool,

    /// Every add becomes a return while set.
    #[serde(default)]
    pub return_mode: bool,

    #[serde(default = "Utc::now")]
    pub opened_at: DateTime<Utc>,

    #[serde(default)]
    pub selection: SelectionContext,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            cursor: None,
            discount_codes: Vec::new(),
            tax_exempt: false,
            return_mode: false,
            opened_at: Utc::now(),
            selection: SelectionContext::default(),
        }
    }

    /// Loads a cart snapshot.
    ///
    /// A snapshot gets the same checks as register input: line count, every
    /// line's id, quantity and prices, every discount code, and the cursor.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let cart: Cart = serde_json::from_str(json)?;
        if cart.items.len() > crate::MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: crate::MAX_CART_ITEMS,
            });
        }
        for item in &cart.items {
            validate_line_item(item)?;
        }
        for code in &cart.discount_codes {
            validate_discount_code(code)?;
        }
        if let Some(index) = cart.cursor {
            if index >= cart.items.len() {
                return Err(CoreError::LineNotFound {
                    index,
                    len: cart.items.len(),
                });
            }
        }
        Ok(cart)
    }

    /// The line under modification.
    pub fn cursor_item(&self) -> Option<&LineItem> {
        self.cursor.and_then(|index| self.items.get(index))
    }

    /// Moves the cursor to an existing line.
    pub fn set_cursor(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.items.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.items.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    /// Adds a catalog button, merging into an identical line when allowed.
    ///
    /// ## Quantity
    /// - typed entry sets it (custom-rate entries also set the price)
    /// - a negative catalog price becomes a positive price on a return
    /// - return mode forces a negative quantity
    /// - `max_quantity` caps it
    ///
    /// Returns the index of the added or merged line; the cursor moves there.
    pub fn add_button(
        &mut self,
        button: &CatalogButton,
        entry: Option<QuantityEntry>,
        config: &PricingConfig,
    ) -> CoreResult<usize> {
        validate_price_cents(button.price.cents())?;
        let mut item = LineItem::from_button(button);

        if item.price.is_negative() {
            item.price = item.price.abs();
            item.full_price = item.price;
            item.quantity = -item.quantity;
        }

        match entry {
            Some(QuantityEntry::Quantity { quantity }) => item.quantity = quantity,
            Some(QuantityEntry::CustomRate { quantity, rate })
                if item.function == Some(LineFunction::CustomRate) =>
            {
                validate_price_cents(rate.cents())?;
                item.quantity = quantity;
                item.price = rate;
                item.full_price = rate;
            }
            Some(QuantityEntry::CustomRate { .. }) => {
                return Err(CoreError::InvalidEntry(format!(
                    "{} does not take a custom rate",
                    item.title
                )));
            }
            None => {}
        }

        if self.return_mode {
            item.quantity = -item.quantity.saturating_abs().max(1);
        }
        if let Some(max) = item.max_quantity.filter(|max| *max < item.quantity) {
            item.quantity = max;
        }
        if item.quantity.unsigned_abs() > MAX_ITEM_QUANTITY.unsigned_abs() {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(item.quantity)?;

        let mergeable = !config.is_unmerged(item.category.as_deref());
        let existing = mergeable
            .then(|| self.items.iter().position(|line| line.is_same_line(&item)))
            .flatten();

        let index = match existing {
            Some(index) => self.merge_into(index, item)?,
            None => {
                if validate_cart_size(self.items.len()).is_err() {
                    return Err(CoreError::CartTooLarge {
                        max: crate::MAX_CART_ITEMS,
                    });
                }
                self.items.push(item);
                self.items.len() - 1
            }
        };

        self.cursor = Some(index);
        self.select_for_button(button);
        Ok(index)
    }

    /// Adds `item`'s quantity to line `index` and moves that line to the end.
    fn merge_into(&mut self, index: usize, item: LineItem) -> CoreResult<usize> {
        let mut line = self.items.remove(index);
        let mut quantity = line.quantity + item.quantity;
        if item.max_quantity.is_some_and(|max| quantity > max) {
            debug!(title = %line.title, "Merge would exceed max quantity, adding nothing");
            quantity = line.quantity;
        }
        if quantity.abs() > MAX_ITEM_QUANTITY {
            let requested = quantity;
            self.items.insert(index, line);
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        debug!(title = %line.title, quantity, "Merged into existing line");
        line.quantity = quantity;
        self.items.push(line);
        Ok(self.items.len() - 1)
    }

    fn select_for_button(&mut self, button: &CatalogButton) {
        let unlocked = button.unlocks();
        self.selection.item_classes = if button.function == Some(LineFunction::AddMods) {
            union_classes(&unlocked, &self.selection.item_classes)
        } else {
            unlocked
        };
        self.selection.modifier_mod_classes.clear();
        self.selection.current_class = None;
        self.selection.parent_class = None;
        if let Some(composite) = button.mod_class {
            self.selection.enter_class(composite, true);
        }
    }

    /// Applies a modifier to the line under the cursor.
    ///
    /// Without a cursor nothing happens and `Ok(None)` is returned.
    pub fn apply_modifier(&mut self, modifier: &Modifier) -> CoreResult<Option<ModifierOutcome>> {
        let Some(index) = self.cursor else {
            debug!(modifier = %modifier.title, "No line under modification, ignoring modifier");
            return Ok(None);
        };
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index, len })?;

        let outcome = apply_modifier(item, modifier);

        let swap = modifier.function == ModifierFunction::Swap;
        if swap {
            self.selection.item_classes = outcome.unlocked.clone();
        }
        self.selection.modifier_mod_classes = outcome.unlocked.clone();
        if let Some(scope) = modifier.scope_class {
            let in_group = self.selection.current_class == Some(parent_group(scope));
            if in_group || swap {
                self.selection.enter_class(scope, swap);
            }
        }

        Ok(Some(outcome))
    }

    /// Assembles the modifier board for the current selection.
    ///
    /// `grid` is the tab's button layout, used as base slots when no class is
    /// being built.
    pub fn available_modifiers<C: ModifierCatalog + ?Sized>(
        &self,
        catalog: &C,
        grid: &[Modifier],
        config: &PricingConfig,
    ) -> Vec<Modifier> {
        let target = self.cursor_item();
        let selection = &self.selection;

        let parent = match selection.parent_class {
            Some(class) => filter_available(
                catalog.resolve(&[class]),
                target,
                Some(selection.current_class.unwrap_or(0)),
                config,
            ),
            None => Vec::new(),
        };
        let same_level = filter_available(catalog.resolve(&selection.item_classes), target, None, config);
        let base = match selection.current_class {
            Some(class) => sort_by_sku(filter_available(catalog.resolve(&[class]), target, None, config)),
            None => grid.to_vec(),
        };

        BoardParts {
            base,
            parent,
            same_level,
            modifier_mods: surface_unlocked(catalog, &selection.modifier_mod_classes),
        }
        .assemble()
    }

    /// Adds a discount code; `false` if a code with the same string is
    /// already active.
    pub fn add_discount_code(&mut self, code: DiscountCode) -> CoreResult<bool> {
        validate_discount_code(&code)?;
        if self.discount_codes.iter().any(|c| c.code == code.code) {
            return Ok(false);
        }
        self.discount_codes.push(code);
        Ok(true)
    }

    /// Removes a discount code by string; `false` if it was not active.
    pub fn remove_discount_code(&mut self, code: &str) -> bool {
        let before = self.discount_codes.len();
        self.discount_codes.retain(|c| c.code != code);
        self.discount_codes.len() != before
    }

    /// Removes a line, keeping the cursor on the same line if it survives.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.cursor = match self.cursor {
            Some(cursor) if cursor == index => None,
            Some(cursor) if cursor > index => Some(cursor - 1),
            other => other,
        };
        Ok(removed)
    }

    pub fn set_tax_exempt(&mut self, exempt: bool) {
        self.tax_exempt = exempt;
    }

    pub fn set_return_mode(&mut self, enabled: bool) {
        self.return_mode = enabled;
    }

    /// Clears lines, codes and flags.
    pub fn clear(&mut self) {
        *self = Cart::new();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prices the cart from scratch.
    pub fn recompute(&self, config: &PricingConfig) -> ComputedOrder {
        recompute(&self.items, &self.discount_codes, self.tax_exempt, config)
    }

    /// Prices the cart and shapes it for order submission.
    pub fn submission(&self, config: &PricingConfig) -> OrderSubmission {
        OrderSubmission::from_computed(&self.recompute(config), &self.discount_codes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
