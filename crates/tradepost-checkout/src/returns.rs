//! # Returns Workflow
//!
//! The returns screen controller: look up a customer's outstanding rentals
//! by phone, tick off the records being returned, commit.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Returns Flow                                        │
//! │                                                                         │
//! │  phone input ──► search() ──► GET outstanding-rentals                  │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  rental list (server order) ──► toggle(rental_id) per row              │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  commit_return() ──► item_ids of selected rows, in list order          │
//! │                     │                                                   │
//! │                     ├── Committed: list and selection cleared,         │
//! │                     │              phone kept for a follow-up lookup   │
//! │                     └── Rejected: selection preserved                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Selection is keyed by rental record id, and the commit payload carries
//! one item id per selected record. Two open rentals of the same item
//! therefore produce that item id twice, which is exactly what the server's
//! per-unit restock expects.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use tradepost_core::{
    normalize_phone, validate_lookup_phone, Employee, OutstandingRental, TransactionRequest,
};

use crate::api::TransactionApi;
use crate::error::{CheckoutError, CheckoutResult};
use crate::submit::{SubmitMachine, SubmitOutcome, SubmitPhase};

// =============================================================================
// Returns State
// =============================================================================

#[derive(Debug, Default)]
struct ReturnsState {
    /// Phone field as typed; normalized for lookup and commit.
    customer_phone: String,
    /// Outstanding rentals from the last successful lookup, server order.
    rentals: Vec<OutstandingRental>,
    /// Rental record ids ticked for return.
    selection: HashSet<i64>,
}

/// Projects the selection onto item ids, preserving the rental list's
/// order. Duplicate item ids stay: each selected record returns one unit.
fn selected_item_ids(rentals: &[OutstandingRental], selection: &HashSet<i64>) -> Vec<i64> {
    rentals
        .iter()
        .filter(|r| selection.contains(&r.id))
        .map(|r| r.item_id)
        .collect()
}

// =============================================================================
// Returns Workflow
// =============================================================================

/// Controller for the returns screen.
pub struct ReturnsWorkflow {
    api: Arc<dyn TransactionApi>,
    machine: Arc<SubmitMachine>,
    employee: Employee,
    success_hold: Duration,
    state: Mutex<ReturnsState>,
}

impl ReturnsWorkflow {
    pub(crate) fn new(
        api: Arc<dyn TransactionApi>,
        machine: Arc<SubmitMachine>,
        employee: Employee,
        success_hold: Duration,
    ) -> Self {
        ReturnsWorkflow {
            api,
            machine,
            employee,
            success_hold,
            state: Mutex::new(ReturnsState::default()),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Stores the phone field as typed.
    pub fn set_customer_phone(&self, raw: &str) {
        self.state
            .lock()
            .expect("returns state lock poisoned")
            .customer_phone = raw.to_string();
    }

    /// Phone field contents, as typed.
    pub fn customer_phone(&self) -> String {
        self.state
            .lock()
            .expect("returns state lock poisoned")
            .customer_phone
            .clone()
    }

    /// Looks up the customer's outstanding rentals.
    ///
    /// The lookup rule is looser than the commit rule: at least 10 digits.
    /// A failing lookup clears the list; a malformed phone never reaches the
    /// network. Any prior selection is discarded either way. Returns the
    /// number of records found.
    pub async fn search(&self) -> CheckoutResult<usize> {
        let phone = {
            let mut state = self.state.lock().expect("returns state lock poisoned");
            state.selection.clear();
            normalize_phone(&state.customer_phone)
        };
        validate_lookup_phone(&phone)?;

        info!(digits = phone.len(), "looking up outstanding rentals");
        match self.api.outstanding_rentals(&phone).await {
            Ok(rentals) => {
                let count = rentals.len();
                self.state
                    .lock()
                    .expect("returns state lock poisoned")
                    .rentals = rentals;
                Ok(count)
            }
            Err(api_err) => {
                self.state
                    .lock()
                    .expect("returns state lock poisoned")
                    .rentals
                    .clear();
                Err(CheckoutError::from(api_err))
            }
        }
    }

    /// Rentals from the last successful lookup.
    pub fn rentals(&self) -> Vec<OutstandingRental> {
        self.state
            .lock()
            .expect("returns state lock poisoned")
            .rentals
            .clone()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles one rental record's selection; returns its new state.
    /// Ignores ids not present in the current list.
    pub fn toggle(&self, rental_id: i64) -> bool {
        let mut state = self.state.lock().expect("returns state lock poisoned");
        if !state.rentals.iter().any(|r| r.id == rental_id) {
            return false;
        }
        if state.selection.remove(&rental_id) {
            false
        } else {
            state.selection.insert(rental_id);
            true
        }
    }

    /// Number of records ticked.
    pub fn selected_count(&self) -> usize {
        self.state
            .lock()
            .expect("returns state lock poisoned")
            .selection
            .len()
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Commits the selected returns.
    ///
    /// On success the list and selection are cleared, but the phone stays:
    /// the common follow-up is another lookup for the same customer.
    pub async fn commit_return(&self) -> SubmitOutcome {
        let request = {
            let state = self.state.lock().expect("returns state lock poisoned");
            TransactionRequest::Return {
                customer_phone: normalize_phone(&state.customer_phone),
                item_ids: selected_item_ids(&state.rentals, &state.selection),
            }
        };

        // No cart on this screen: lines and snapshot are empty, so the
        // machine's checks reduce to phone shape and a non-empty selection.
        let outcome = self.machine.commit(request, &[], &[]).await;

        if let SubmitOutcome::Committed(record) = &outcome {
            {
                let mut state = self.state.lock().expect("returns state lock poisoned");
                state.selection.clear();
                state.rentals.clear();
            }
            info!(
                employee = %self.employee.username,
                transaction_id = record.id,
                "return recorded"
            );
            self.machine.reset_after(self.success_hold);
        }

        outcome
    }

    /// Current machine phase.
    pub fn phase(&self) -> SubmitPhase {
        self.machine.phase()
    }

    /// Reason for the most recent failure, if any.
    pub fn last_error(&self) -> Option<CheckoutError> {
        self.machine.last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rental(id: i64, item_id: i64, name: &str) -> OutstandingRental {
        OutstandingRental {
            id,
            item_id,
            item_name: name.to_string(),
            rental_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            days_overdue: 0,
            is_overdue: false,
        }
    }

    #[test]
    fn test_selected_item_ids_preserves_duplicates_and_order() {
        // Two open rentals of item 5, one of item 9.
        let rentals = vec![rental(101, 5, "Kayak"), rental(102, 9, "Paddle"), rental(103, 5, "Kayak")];
        let selection: HashSet<i64> = [101, 103].into_iter().collect();

        assert_eq!(selected_item_ids(&rentals, &selection), vec![5, 5]);
    }

    #[test]
    fn test_selected_item_ids_empty_selection() {
        let rentals = vec![rental(101, 5, "Kayak")];
        assert!(selected_item_ids(&rentals, &HashSet::new()).is_empty());
    }
}
