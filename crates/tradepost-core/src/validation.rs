//! # Validation Module
//!
//! Input validation rules shared by the cart, checkout, and returns
//! workflows.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input normalization                                          │
//! │  ├── normalize_phone strips non-digits as the operator types           │
//! │  └── normalize_coupon trims and drops blank codes                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - local predicates, no network                   │
//! │  ├── phone format (commit-time: 10-15 digits; lookup: at least 10)     │
//! │  └── search-term length cap                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Transaction service                                          │
//! │  └── authoritative stock and business-rule checks at commit            │
//! │                                                                         │
//! │  Defense in depth: a request that fails here never reaches the wire    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_SEARCH_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum digits in a customer phone number.
pub const PHONE_MIN_DIGITS: usize = 10;

/// Maximum digits in a customer phone number.
pub const PHONE_MAX_DIGITS: usize = 15;

// =============================================================================
// Phone Validators
// =============================================================================

/// Strips every non-digit character from raw phone input.
///
/// Mirrors the input handler on the phone field: the operator can paste
/// `(555) 123-4567` and the stored value becomes `5551234567`.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validates a customer phone number for commit: digits only, 10-15 of them.
///
/// ## Example
/// ```rust
/// use tradepost_core::validation::validate_customer_phone;
///
/// assert!(validate_customer_phone("1234567890").is_ok());
/// assert!(validate_customer_phone("12345").is_err());
/// assert!(validate_customer_phone("1234567890123456").is_err());
/// assert!(validate_customer_phone("555-123-4567").is_err()); // normalize first
/// ```
pub fn validate_customer_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "customer phone".to_string(),
        });
    }

    if !phone.chars().all(|c| c.is_ascii_digit())
        || phone.len() < PHONE_MIN_DIGITS
        || phone.len() > PHONE_MAX_DIGITS
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: format!("must be {PHONE_MIN_DIGITS}-{PHONE_MAX_DIGITS} digits"),
        });
    }

    Ok(())
}

/// Validates a phone number for the outstanding-rentals lookup.
///
/// Deliberately weaker than [`validate_customer_phone`]: the lookup only
/// needs enough digits to identify a customer (at least 10); the full 10-15
/// rule is re-applied when the Return commit is validated.
pub fn validate_lookup_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "customer phone".to_string(),
        });
    }

    if !phone.chars().all(|c| c.is_ascii_digit()) || phone.len() < PHONE_MIN_DIGITS {
        return Err(ValidationError::TooShort {
            field: "customer phone".to_string(),
            min: PHONE_MIN_DIGITS,
        });
    }

    Ok(())
}

// =============================================================================
// Search & Coupon
// =============================================================================

/// Validates a catalog search term.
///
/// ## Rules
/// - Can be empty (an empty filter loads the unfiltered catalog)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Trims a coupon code and maps blank input to `None`.
///
/// The coupon is opaque to the client: it is forwarded verbatim, and an
/// invalid code is silently ignored server-side.
pub fn normalize_coupon(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
