//! # Validation Module
//!
//! Input checks for register entries before they reach the cart.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register UI                                                  │
//! │  ├── Typed entry parsing (QuantityEntry::parse)                        │
//! │  └── Immediate feedback (block sound, keep typed text)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart mutations                                               │
//! │  └── THIS MODULE: quantity, price, code and size checks                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Recomputation                                                │
//! │  └── Never fails: configuration gaps count as zero                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use midway_core::validation::{validate_quantity, validate_rate_bps};
//!
//! validate_quantity(-2).unwrap(); // returns are negative quantities
//! validate_rate_bps(825).unwrap();
//! ```

use crate::discount::{DiscountCode, DiscountType};
use crate::error::ValidationError;
use crate::line_item::LineItem;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must not be zero (negative quantities are returns)
/// - |quantity| must not exceed MAX_ITEM_QUANTITY (9999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Register: Add Item                                                     │
/// │                                                                         │
/// │  Cashier types 5, taps "Soda"                                          │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty == 0? → Error: "quantity must not be zero"               │
/// │       │                                                                 │
/// │       ├── |qty| > 9999? → Error: out of range                          │
/// │       │                                                                 │
/// │       └── OK → line added or merged                                    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "quantity".to_string(),
        });
    }

    if qty.unsigned_abs() > MAX_ITEM_QUANTITY.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_ITEM_QUANTITY,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Zero is allowed (free items, wristbands)
/// - Negative is allowed (return buttons)
/// - |price| must not exceed MAX_PRICE_CENTS
///
/// ## Example
/// ```rust
/// use midway_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(-500).is_ok());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents.checked_abs().map_or(true, |abs| abs > MAX_PRICE_CENTS) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: -MAX_PRICE_CENTS,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Discount Validators
// =============================================================================

/// Validates a discount code before it is added to the order.
///
/// ## Rules
/// - Code must not be empty, at most 64 characters
/// - Percentage amounts (base and overrides) must be 0-10000 bps
/// - Fixed amounts must be non-negative
///
/// A missing amount passes: it counts as zero during pricing.
pub fn validate_discount_code(code: &DiscountCode) -> ValidationResult<()> {
    let text = code.code.trim();
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }
    if text.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 64,
        });
    }

    let amounts = code
        .amount
        .into_iter()
        .chain(code.categories.iter().filter_map(|c| c.discount));

    for amount in amounts {
        match code.kind {
            DiscountType::Percentage if !(0..=10000).contains(&amount) => {
                return Err(ValidationError::OutOfRange {
                    field: "amount".to_string(),
                    min: 0,
                    max: 10000,
                });
            }
            DiscountType::FixedAmount | DiscountType::Shipping if amount < 0 => {
                return Err(ValidationError::OutOfRange {
                    field: "amount".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
            _ => {}
        }
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before adding a line.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates a line loaded from outside the register (cart snapshot or
/// stored order).
///
/// ## Rules
/// - Id must be a UUID
/// - Quantity, price, full price, every discount allocation and every
///   modifier price pass the numeric validators above
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_uuid(&item.id)?;
    validate_quantity(item.quantity)?;
    validate_price_cents(item.price.cents())?;
    validate_price_cents(item.full_price.cents())?;
    for allocation in &item.discount_allocations {
        validate_price_cents(allocation.cents())?;
    }
    for property in &item.properties {
        validate_price_cents(property.add_price.cents())?;
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a line id.
///
/// ## Example
/// ```rust
/// use midway_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
