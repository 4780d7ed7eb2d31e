//! # Error Types
//!
//! Domain-specific error types for tradepost-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tradepost-core errors (this file)                                     │
//! │  ├── CoreError        - Cart/stock domain errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tradepost-checkout errors (separate crate)                            │
//! │  ├── ApiError         - Classified transport-boundary faults           │
//! │  └── CheckoutError    - Tagged Failed reasons for the submit machine   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError            (cart mutations)         │
//! │        ValidationError → CheckoutError        (commit validation)      │
//! │        ApiError        → CheckoutError        (network faults)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, quantities, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent cart rule violations. They are surfaced to the
/// operator as warnings and never abort the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Item id not present in the current catalog snapshot.
    #[error("Item {0} not found in inventory")]
    ItemNotFound(i64),

    /// Item has zero known stock; it cannot be added to the cart.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Requested quantity exceeds the last-known stock for the item.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart / edit quantity (requested: 5)
    ///      │
    ///      ▼
    /// Check snapshot: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Ski Poles", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock for Ski Poles. Available: 3, Requested: 5"
    /// ```
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Quantity edit targeted an item that has no cart line.
    #[error("Item {0} is not in the cart")]
    NotInCart(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must have entries is empty (cart, return selection).
    #[error("{field} is empty")]
    Empty { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-digit phone characters).
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
        let err = CoreError::InsufficientStock {
            name: "Ski Poles".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Ski Poles. Available: 3, Requested: 5"
        );

        let err = CoreError::OutOfStock {
            name: "Tent".to_string(),
        };
        assert_eq!(err.to_string(), "Tent is out of stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Empty {
            field: "cart".to_string(),
        };
        assert_eq!(err.to_string(), "cart is empty");

        let err = ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: "must be 10-15 digits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "customer phone has invalid format: must be 10-15 digits"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
