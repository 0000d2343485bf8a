//! # Error Types
//!
//! Domain-specific error types for midway-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  midway-core errors (this file)                                        │
//! │  ├── CoreError        - Cart / input failures                          │
//! │  └── ValidationError  - Field-level input checks                       │
//! │                                                                         │
//! │  midway-cli errors (separate crate)                                    │
//! │  └── CliError         - Config, file and JSON failures                 │
//! │                                                                         │
//! │  NOT an error: the recomputation pass. Missing amounts, exhausted      │
//! │  returns and rounding remainders are handled in-band and the pass      │
//! │  always yields a complete ComputedOrder.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and input errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cursor or removal index does not point at a line.
    #[error("No line item at index {index} (cart has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A typed register entry (`5`, `3x12.99`) could not be read.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier types "3x12.9.9" then taps a custom-rate button
    ///      │
    ///      ▼
    /// QuantityEntry::parse → InvalidEntry("3x12.9.9")
    ///      │
    ///      ▼
    /// UI blocks the add and keeps the typed text
    /// ```
    #[error("Invalid register entry: {0}")]
    InvalidEntry(String),

    /// A decimal money string could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A cart snapshot could not be decoded.
    #[error("Invalid cart snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineNotFound { index: 4, len: 2 };
        assert_eq!(err.to_string(), "No line item at index 4 (cart has 2 lines)");

        let err = CoreError::QuantityTooLarge {
            requested: 12000,
            max: 9999,
        };
        assert_eq!(err.to_string(), "Quantity 12000 exceeds maximum allowed (9999)");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::MustBeNonZero {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must not be zero");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
