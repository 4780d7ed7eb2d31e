//! # Submission State Machine
//!
//! The single authoritative commit path. Every sale, rental, and return goes
//! through one machine instance, which guarantees at most one in-flight
//! commit and resolves every attempt to a terminal phase.
//!
//! ## Phase Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Submission Phases                                   │
//! │                                                                         │
//! │      commit()            validation ok           response               │
//! │  Idle ───────► Validating ───────────► Submitting ───────► Succeeded   │
//! │   ▲                │                        │                  │        │
//! │   │                │ validation fails       │ fault            │ hold   │
//! │   │                ▼                        ▼                  │ timer  │
//! │   │              Failed ◄──────────────────┘                  │        │
//! │   │                │                                           │        │
//! │   └────────────────┴─── reset() ──────────────────────────────┘        │
//! │                                                                         │
//! │  commit() while Validating or Submitting: Ignored, no side effects.    │
//! │  Failed and Succeeded accept a fresh commit() directly.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate check and the validation pass run under one lock acquisition, so
//! two racing callers cannot both pass the gate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use tradepost_core::{
    validate_customer_phone, CartLine, Item, TransactionRecord, TransactionRequest,
    ValidationError,
};

use crate::api::TransactionApi;
use crate::error::CheckoutError;

// =============================================================================
// Submit Phase
// =============================================================================

/// Observable phase of the submission machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    /// No attempt in progress or resolved.
    Idle,
    /// Running local checks; no network yet.
    Validating,
    /// The commit request is in flight.
    Submitting,
    /// The last attempt committed. Held briefly so the operator sees the
    /// confirmation, then reset.
    Succeeded,
    /// The last attempt failed; see [`SubmitMachine::last_error`].
    Failed,
}

impl SubmitPhase {
    /// Whether a new commit attempt may start from this phase.
    #[inline]
    pub const fn can_accept(self) -> bool {
        matches!(
            self,
            SubmitPhase::Idle | SubmitPhase::Succeeded | SubmitPhase::Failed
        )
    }
}

impl std::fmt::Display for SubmitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmitPhase::Idle => "idle",
            SubmitPhase::Validating => "validating",
            SubmitPhase::Submitting => "submitting",
            SubmitPhase::Succeeded => "succeeded",
            SubmitPhase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Submit Outcome
// =============================================================================

/// Result of one call to [`SubmitMachine::commit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The server accepted the transaction.
    Committed(TransactionRecord),
    /// The attempt resolved to Failed, locally or remotely.
    Rejected(CheckoutError),
    /// An attempt was already in flight; this call did nothing.
    Ignored,
}

// =============================================================================
// Checkout Events
// =============================================================================

/// Observer hooks for submission lifecycle events.
///
/// All methods default to no-ops; embedders override what they care about.
pub trait CheckoutEvents: Send + Sync {
    /// A transaction committed successfully.
    fn transaction_committed(&self, _record: &TransactionRecord) {}

    /// A commit attempt resolved to Failed.
    fn checkout_failed(&self, _error: &CheckoutError) {}

    /// The session is gone; the workflow is over until re-authentication.
    fn session_expired(&self) {}

    /// The machine returned to Idle.
    fn workflow_reset(&self) {}
}

/// Event sink that ignores everything. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEvents;

impl CheckoutEvents for NoOpEvents {}

// =============================================================================
// Submit Machine
// =============================================================================

#[derive(Debug)]
struct MachineInner {
    phase: SubmitPhase,
    last_error: Option<CheckoutError>,
}

/// The single-flight submission machine.
///
/// One instance per workflow; shared via `Arc` with the timer task that
/// resets it after a success hold.
pub struct SubmitMachine {
    api: Arc<dyn TransactionApi>,
    events: Arc<dyn CheckoutEvents>,
    inner: Mutex<MachineInner>,
}

impl SubmitMachine {
    pub fn new(api: Arc<dyn TransactionApi>, events: Arc<dyn CheckoutEvents>) -> Self {
        SubmitMachine {
            api,
            events,
            inner: Mutex::new(MachineInner {
                phase: SubmitPhase::Idle,
                last_error: None,
            }),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SubmitPhase {
        self.inner.lock().expect("submit lock poisoned").phase
    }

    /// Reason for the most recent Failed resolution, if any.
    pub fn last_error(&self) -> Option<CheckoutError> {
        self.inner
            .lock()
            .expect("submit lock poisoned")
            .last_error
            .clone()
    }

    // =========================================================================
    // Commit Path
    // =========================================================================

    /// Attempts to commit a transaction.
    ///
    /// Gate and validation happen atomically under the machine lock: a call
    /// arriving while another attempt is Validating or Submitting returns
    /// [`SubmitOutcome::Ignored`] without touching anything. Validation runs
    /// against the given cart lines and catalog snapshot; only a request
    /// that passes every local check reaches the network.
    pub async fn commit(
        &self,
        request: TransactionRequest,
        lines: &[CartLine],
        snapshot: &[Item],
    ) -> SubmitOutcome {
        {
            let mut inner = self.inner.lock().expect("submit lock poisoned");
            if !inner.phase.can_accept() {
                debug!(phase = %inner.phase, "commit ignored: attempt already in flight");
                return SubmitOutcome::Ignored;
            }
            inner.phase = SubmitPhase::Validating;

            if let Err(err) = validate_request(&request, lines, snapshot) {
                warn!(%err, kind = %request.kind(), "commit rejected before network");
                inner.phase = SubmitPhase::Failed;
                inner.last_error = Some(err.clone());
                drop(inner);
                self.events.checkout_failed(&err);
                return SubmitOutcome::Rejected(err);
            }

            inner.phase = SubmitPhase::Submitting;
        }

        info!(kind = %request.kind(), "submitting transaction");
        match self.api.commit(&request).await {
            Ok(record) => {
                {
                    let mut inner = self.inner.lock().expect("submit lock poisoned");
                    inner.phase = SubmitPhase::Succeeded;
                    inner.last_error = None;
                }
                info!(
                    transaction_id = record.id,
                    kind = %request.kind(),
                    "transaction committed"
                );
                self.events.transaction_committed(&record);
                SubmitOutcome::Committed(record)
            }
            Err(api_err) => {
                let err = CheckoutError::from(api_err);
                warn!(%err, kind = %request.kind(), "transaction failed");
                {
                    let mut inner = self.inner.lock().expect("submit lock poisoned");
                    inner.phase = SubmitPhase::Failed;
                    inner.last_error = Some(err.clone());
                }
                if err.is_session_fatal() {
                    self.events.session_expired();
                }
                self.events.checkout_failed(&err);
                SubmitOutcome::Rejected(err)
            }
        }
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Returns the machine to Idle and clears the last error.
    pub fn reset(&self) {
        {
            let mut inner = self.inner.lock().expect("submit lock poisoned");
            inner.phase = SubmitPhase::Idle;
            inner.last_error = None;
        }
        self.events.workflow_reset();
    }

    /// Schedules a reset after the given hold, letting the Succeeded phase
    /// stay visible for the confirmation window.
    pub fn reset_after(self: &Arc<Self>, hold: Duration) {
        let machine = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            machine.reset();
        });
    }
}

// =============================================================================
// Request Validation
// =============================================================================

/// Local preconditions, checked in a fixed order: phone shape first, then
/// non-emptiness, then the stock recheck against the current snapshot.
fn validate_request(
    request: &TransactionRequest,
    lines: &[CartLine],
    snapshot: &[Item],
) -> Result<(), CheckoutError> {
    if let Some(phone) = request.customer_phone() {
        validate_customer_phone(phone)?;
    }

    match request {
        TransactionRequest::Return { item_ids, .. } => {
            if item_ids.is_empty() {
                return Err(ValidationError::Empty {
                    field: "selection".to_string(),
                }
                .into());
            }
        }
        _ => {
            if lines.is_empty() {
                return Err(ValidationError::Empty {
                    field: "cart".to_string(),
                }
                .into());
            }
        }
    }

    for line in lines {
        // Absent from the (search-filtered) snapshot means the stock is
        // unknown, which the recheck treats as zero.
        let available = snapshot
            .iter()
            .find(|i| i.id == line.item.id)
            .map(|i| i.quantity)
            .unwrap_or(0);
        if line.quantity > available {
            return Err(CheckoutError::StaleStock {
                name: line.item.name.clone(),
                available,
                requested: line.quantity,
            });
        }
    }

    Ok(())
}
