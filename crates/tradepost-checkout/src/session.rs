//! # Checkout Session State
//!
//! The mutable working set of one sale/rental workflow: the cart plus the
//! transient operator inputs that ride along with it (customer phone,
//! coupon code).
//!
//! Wrapped in a shared handle with closure accessors so callers never hold
//! the lock across an await.

use std::sync::{Arc, Mutex};

use tradepost_core::Cart;

// =============================================================================
// Checkout Session
// =============================================================================

/// One workflow's cart and transient inputs.
#[derive(Debug, Default)]
pub struct CheckoutSession {
    /// The working cart.
    pub cart: Cart,

    /// Raw customer phone as typed (rental workflows). Normalized at
    /// commit time, not on entry.
    pub customer_phone: String,

    /// Raw coupon code as typed (sale workflows). Trimmed at commit time;
    /// blank means no coupon.
    pub coupon_code: String,
}

impl CheckoutSession {
    /// Clears everything a successful commit consumes: cart, phone, coupon.
    pub fn clear_transients(&mut self) {
        self.cart.clear();
        self.customer_phone.clear();
        self.coupon_code.clear();
    }
}

// =============================================================================
// Session State Handle
// =============================================================================

/// Shared handle to a [`CheckoutSession`].
///
/// ## Access Pattern
/// All access goes through closures, so the lock scope is exactly the
/// closure body:
/// ```rust,ignore
/// let subtotal = state.with_session(|s| s.cart.subtotal());
/// state.with_session_mut(|s| s.cart.clear());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<CheckoutSession>>,
}

impl SessionState {
    /// Creates a fresh, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the session.
    pub fn with_session<T>(&self, f: impl FnOnce(&CheckoutSession) -> T) -> T {
        let session = self.inner.lock().expect("session lock poisoned");
        f(&session)
    }

    /// Write access to the session.
    pub fn with_session_mut<T>(&self, f: impl FnOnce(&mut CheckoutSession) -> T) -> T {
        let mut session = self.inner.lock().expect("session lock poisoned");
        f(&mut session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepost_core::{Item, Money};

    fn item() -> Item {
        Item {
            id: 1,
            legacy_item_id: 1001,
            name: "Lantern".to_string(),
            price: Money::from_cents(1499),
            quantity: 4,
        }
    }

    #[test]
    fn test_clear_transients_empties_everything() {
        let state = SessionState::new();
        state.with_session_mut(|s| {
            s.cart.add(&item()).unwrap();
            s.customer_phone = "(555) 123-4567".to_string();
            s.coupon_code = "SUMMER10".to_string();
        });

        state.with_session_mut(|s| s.clear_transients());

        state.with_session(|s| {
            assert!(s.cart.is_empty());
            assert!(s.customer_phone.is_empty());
            assert!(s.coupon_code.is_empty());
        });
    }

    #[test]
    fn test_clones_share_state() {
        let state = SessionState::new();
        let other = state.clone();

        state.with_session_mut(|s| s.cart.add(&item()).unwrap());

        assert_eq!(other.with_session(|s| s.cart.line_count()), 1);
    }
}
