//! # midway-core: Order Composition & Pricing for Midway POS
//!
//! Turns a register cart (items, modifiers, returns, discount codes) into a
//! priced order: line totals, distributed discounts, per-line tax, return
//! records and kitchen tickets. Pure functions over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Midway POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Register UI / midway-cli                     │   │
//! │  │    Button grid ──► Modifier board ──► Cart ──► Submit          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Cart snapshot (JSON)                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ midway-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │   cart   │  │ modifier │  │ netting  │  │ pricing  │       │   │
//! │  │   │  add /   │─►│  apply / │─►│ returns  │─►│ discount │       │   │
//! │  │   │  merge   │  │  usage   │  │ vs sales │  │ tax, KDS │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CATALOG FETCHES • NO SUBMISSION                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ComputedOrder / OrderSubmission        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              Commerce platform / kitchen display                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Rates, modifier class ids, kitchen routing, line functions
//! - [`catalog`] - Buttons, modifiers and the modifier cache
//! - [`line_item`] - Cart lines and their properties
//! - [`modifier`] - Applying a modifier to a line
//! - [`usage`] - Which modifiers are offered next
//! - [`netting`] - Returns against purchases
//! - [`discount`] - Discount codes and the order-level descriptor
//! - [`pricing`] - The recomputation pass
//! - [`kitchen`] - Kitchen display entries
//! - [`order`] - Submission and stored-order snapshots
//! - [`cart`] - The stateful cart
//! - [`validation`] - Input checks
//!
//! ## Design Principles
//!
//! 1. **Recompute from scratch**: every mutation re-prices the whole cart
//! 2. **Integer Money**: all monetary values are cents (i64)
//! 3. **Penny conservation**: split lines always add back up to the original
//! 4. **Explicit Errors**: typed errors for mutations; pricing never fails
//!
//! ## Example Usage
//!
//! ```rust
//! use midway_core::{Cart, CatalogButton, DiscountCode, Money, PricingConfig, Rate};
//!
//! let config = PricingConfig::default();
//! let mut cart = Cart::new();
//!
//! let hat = CatalogButton {
//!     title: "Hat".to_string(),
//!     price: Money::from_cents(1000),
//!     taxable: true,
//!     ..CatalogButton::default()
//! };
//! cart.add_button(&hat, None, &config).unwrap();
//! cart.add_discount_code(DiscountCode::percentage("TEN", Rate::from_bps(1000))).unwrap();
//!
//! let order = cart.recompute(&config);
//! assert_eq!(order.subtotal.cents(), 900);
//! assert_eq!(order.tax.cents(), 74); // 8.25% of $9.00
//! assert_eq!(order.total.cents(), 974);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod error;
pub mod kitchen;
pub mod line_item;
pub mod modifier;
pub mod money;
pub mod netting;
pub mod order;
pub mod pricing;
pub mod types;
pub mod usage;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, QuantityEntry, SelectionContext};
pub use catalog::{CatalogButton, CatalogCache, Modifier, ModifierCatalog, ModifierDiscount};
pub use config::PricingConfig;
pub use discount::{CategoryOverride, DiscountCode, DiscountType, OrderDiscount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use kitchen::KitchenTicketItem;
pub use line_item::{LineItem, LineItemProperty, PropertyKind, TaxLine};
pub use money::Money;
pub use netting::ReturnRecord;
pub use order::{restore_stored_order, OrderSubmission};
pub use pricing::{compute_order, recompute, ComputedOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum |quantity| of a single line.
///
/// ## Business Reason
/// Typed entries above this are almost always a scanned barcode landing in
/// the quantity field.
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// Maximum |unit price| in cents ($1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
