//! # Checkout Error Types
//!
//! The closed taxonomy of Failed reasons for the submission state machine.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local (no      │  │   Session       │  │     Server              │ │
//! │  │  network call)  │  │                 │  │                         │ │
//! │  │                 │  │  SessionExpired │  │  PermissionDenied       │ │
//! │  │  Validation     │  │                 │  │  Rejected               │ │
//! │  │  StaleStock     │  │                 │  │  Transport              │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Every fault resolves the machine to Failed with one of these tags.    │
//! │  None crash the workflow. The only silently-degraded failure is a      │
//! │  catalog refresh, which keeps the last good snapshot.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tradepost_core::ValidationError;

use crate::api::ApiError;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Tagged reason for a Failed submission.
///
/// ## Design Principles
/// - Produced either locally (Validation, StaleStock) or by the single
///   classification step at the transport boundary (the rest)
/// - Internal logic never inspects raw transport error shapes
/// - Display strings are the operator-facing messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Local Faults (no network attempted)
    // =========================================================================
    /// Operator input failed a local predicate: malformed phone, empty cart
    /// or selection. Always recoverable in place.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The validation-time stock recheck failed even though the cart
    /// previously allowed the line: the snapshot changed underneath.
    /// Surfaced distinctly so the UI can prompt a refresh.
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    StaleStock {
        name: String,
        available: i64,
        requested: i64,
    },

    // =========================================================================
    // Session Faults
    // =========================================================================
    /// The session is no longer valid. Fatal to the current workflow; session
    /// recovery belongs to the auth collaborator and is never retried here.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    // =========================================================================
    // Server Faults
    // =========================================================================
    /// The operator lacks permission for the attempted transaction kind.
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    /// A server-side business rule rejected the commit (e.g. stock depleted
    /// between client check and commit). Message reported verbatim.
    #[error("{message}")]
    Rejected { message: String },

    /// No response reached the server: connectivity problem, no retry.
    #[error("Network error: {message}")]
    Transport { message: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthenticated => CheckoutError::SessionExpired,
            ApiError::Forbidden => CheckoutError::PermissionDenied,
            ApiError::Rejected { message } => CheckoutError::Rejected { message },
            ApiError::Transport { message } => CheckoutError::Transport { message },
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CheckoutError {
    /// Returns true if the operator can fix the cause in place and resubmit.
    pub fn is_recoverable(&self) -> bool {
        !self.is_session_fatal()
    }

    /// Returns true if this fault ends the workflow: the session is gone and
    /// only the auth collaborator can bring it back.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, CheckoutError::SessionExpired)
    }

    /// Returns true if cart and transient fields must be preserved so the
    /// operator can correct and retry.
    pub fn preserves_cart(&self) -> bool {
        !self.is_session_fatal()
    }

    /// Returns true if no network call was made for this fault.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_) | CheckoutError::StaleStock { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification_maps_to_tags() {
        assert_eq!(
            CheckoutError::from(ApiError::Unauthenticated),
            CheckoutError::SessionExpired
        );
        assert_eq!(
            CheckoutError::from(ApiError::Forbidden),
            CheckoutError::PermissionDenied
        );
        assert_eq!(
            CheckoutError::from(ApiError::Rejected {
                message: "Insufficient stock".into()
            }),
            CheckoutError::Rejected {
                message: "Insufficient stock".into()
            }
        );
        assert!(matches!(
            CheckoutError::from(ApiError::Transport {
                message: "connection refused".into()
            }),
            CheckoutError::Transport { .. }
        ));
    }

    #[test]
    fn test_categorization() {
        let stale = CheckoutError::StaleStock {
            name: "Tent".into(),
            available: 0,
            requested: 1,
        };
        assert!(stale.is_recoverable());
        assert!(stale.is_local());
        assert!(stale.preserves_cart());

        let expired = CheckoutError::SessionExpired;
        assert!(expired.is_session_fatal());
        assert!(!expired.is_recoverable());
        assert!(!expired.is_local());
    }

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = CheckoutError::Rejected {
            message: "Coupon expired on 2024-01-01".into(),
        };
        assert_eq!(err.to_string(), "Coupon expired on 2024-01-01");
    }
}
