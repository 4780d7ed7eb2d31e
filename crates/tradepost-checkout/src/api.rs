//! # Transaction API Seam
//!
//! The object-safe trait the engine talks to instead of a concrete HTTP
//! client, plus the single classification step that turns raw transport
//! outcomes into the closed [`ApiError`] set.
//!
//! ## Why a Trait?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TransactionApi Seam                                 │
//! │                                                                         │
//! │  CatalogCache ──┐                                                       │
//! │  SubmitMachine ─┼──► dyn TransactionApi ──┬──► HttpApi (production)    │
//! │  ReturnsWorkflow┘                          └──► scripted fakes (tests)  │
//! │                                                                         │
//! │  Errors cross this seam already classified: internal logic never       │
//! │  inspects status codes or response bodies.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use thiserror::Error;

use tradepost_core::{Item, OutstandingRental, TransactionRecord, TransactionRequest};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Api Error
// =============================================================================

/// Classified transport-boundary faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 401: the session cookie is gone or expired.
    #[error("session expired")]
    Unauthenticated,

    /// HTTP 403: the employee lacks permission for this operation.
    #[error("permission denied")]
    Forbidden,

    /// Any other non-2xx: the server processed and refused the request.
    /// The message is taken verbatim from the response body.
    #[error("{message}")]
    Rejected { message: String },

    /// The request never produced a usable response: connect failure,
    /// timeout, or a body that failed to decode.
    #[error("network error: {message}")]
    Transport { message: String },
}

// =============================================================================
// Transaction Api Trait
// =============================================================================

/// The engine's view of the inventory/transaction service.
///
/// The three commit endpoints fold into one `commit` method: the submission
/// machine is the single authoritative commit path, and the implementation
/// dispatches on [`TransactionRequest::kind`].
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// `GET items?search=<term>` - returns the filtered catalog snapshot.
    async fn search_items(&self, term: &str) -> ApiResult<Vec<Item>>;

    /// `POST transactions/{sale|rental|return}` - commits a transaction.
    async fn commit(&self, request: &TransactionRequest) -> ApiResult<TransactionRecord>;

    /// `GET transactions/outstanding-rentals?customer_phone=<p>` - lists a
    /// customer's open rental records.
    async fn outstanding_rentals(&self, phone: &str) -> ApiResult<Vec<OutstandingRental>>;
}

// =============================================================================
// Classification
// =============================================================================

/// Maps a non-2xx response to an [`ApiError`].
///
/// This is the only place status codes are interpreted.
pub fn classify_status(status: u16, body: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthenticated,
        403 => ApiError::Forbidden,
        _ => ApiError::Rejected {
            message: rejection_message(body),
        },
    }
}

/// Extracts the server's message from an error body.
///
/// The service writes `{"error": "..."}`; its framework-level rejections use
/// `{"detail": "..."}`. Anything else gets a generic fallback.
fn rejection_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    "The server rejected the request".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_statuses() {
        assert_eq!(classify_status(401, ""), ApiError::Unauthenticated);
        assert_eq!(classify_status(403, ""), ApiError::Forbidden);
    }

    #[test]
    fn test_classify_rejection_reads_error_key() {
        let err = classify_status(400, r#"{"error":"Insufficient stock for Tent"}"#);
        assert_eq!(
            err,
            ApiError::Rejected {
                message: "Insufficient stock for Tent".to_string()
            }
        );
    }

    #[test]
    fn test_classify_rejection_falls_back_to_detail_key() {
        let err = classify_status(400, r#"{"detail":"Invalid input."}"#);
        assert_eq!(
            err,
            ApiError::Rejected {
                message: "Invalid input.".to_string()
            }
        );
    }

    #[test]
    fn test_classify_rejection_generic_fallback() {
        let err = classify_status(500, "<html>Internal Server Error</html>");
        assert_eq!(
            err,
            ApiError::Rejected {
                message: "The server rejected the request".to_string()
            }
        );
    }
}
