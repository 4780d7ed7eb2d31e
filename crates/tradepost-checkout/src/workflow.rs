//! # Cart Workflows
//!
//! The sale and rental controllers: one object per open workflow screen,
//! wiring a [`SessionState`], a [`CatalogCache`], and a [`SubmitMachine`]
//! into the operation set the UI calls.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart Workflow Lifecycle                             │
//! │                                                                         │
//! │  enter() ──► initial catalog load (empty filter)                       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  search_changed / add_to_cart / set_quantity / remove / clear_cart     │
//! │  set_customer_phone (rental) / set_coupon_code (sale)                  │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  commit() ──► machine validates + submits                              │
//! │     ├── Committed: clear cart+transients, refresh catalog,             │
//! │     │              log attribution, hold Succeeded, then reset         │
//! │     └── Rejected: cart and inputs preserved for correction             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  close() ──► cancel any pending debounced search                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each workflow owns its own machine and catalog: a rejected sale never
//! blocks an unrelated rental screen.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use tradepost_core::{
    normalize_coupon, normalize_phone, validate_search_query, CoreError, CoreResult,
    DerivedTotals, Employee, Item, TransactionKind, TransactionRequest, ValidationResult,
};

use crate::api::TransactionApi;
use crate::catalog::{CatalogCache, CatalogConfig};
use crate::error::CheckoutError;
use crate::returns::ReturnsWorkflow;
use crate::session::SessionState;
use crate::submit::{CheckoutEvents, NoOpEvents, SubmitMachine, SubmitOutcome, SubmitPhase};

// =============================================================================
// Workflow Configuration
// =============================================================================

/// Timing knobs shared by all workflows.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Quiet window before a changed search term fires a fetch.
    pub debounce: Duration,

    /// How long the Succeeded phase stays visible before the machine
    /// resets to Idle.
    pub success_hold: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            debounce: Duration::from_millis(300),
            success_hold: Duration::from_secs(2),
        }
    }
}

// =============================================================================
// Cart Workflow
// =============================================================================

/// Controller for a sale or rental screen.
pub struct CartWorkflow {
    /// Sale or Rental; returns have their own controller
    /// ([`ReturnsWorkflow`]).
    kind: TransactionKind,
    session: SessionState,
    catalog: CatalogCache,
    machine: Arc<SubmitMachine>,
    employee: Employee,
    success_hold: Duration,
}

impl CartWorkflow {
    /// Loads the initial unfiltered catalog. Call once when the screen
    /// opens.
    pub async fn enter(&self) {
        info!(kind = %self.kind, employee = %self.employee.username, "workflow opened");
        self.catalog.refresh("").await;
    }

    /// Cancels any pending debounced search. Call when the screen closes.
    pub fn close(&self) {
        self.catalog.cancel_pending();
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Reacts to a changed search term: validates it, then schedules a
    /// debounced fetch. A cleared term cancels without refetching.
    pub fn search_changed(&self, term: &str) -> ValidationResult<()> {
        let term = validate_search_query(term)?;
        self.catalog.schedule_search(&term);
        Ok(())
    }

    /// Current catalog snapshot.
    pub fn items(&self) -> Vec<Item> {
        self.catalog.snapshot()
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Adds one unit of a snapshot item to the cart.
    pub fn add_to_cart(&self, item_id: i64) -> CoreResult<()> {
        let item = self
            .catalog
            .snapshot()
            .into_iter()
            .find(|i| i.id == item_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;

        self.session.with_session_mut(|s| s.cart.add(&item))
    }

    /// Sets a line quantity. The stock ceiling comes from the current
    /// snapshot when the item is still in it, else from the frozen copy.
    pub fn set_quantity(&self, item_id: i64, quantity: i64) -> CoreResult<()> {
        let known_stock = self.catalog.stock_for(item_id);
        self.session
            .with_session_mut(|s| s.cart.set_quantity(item_id, quantity, known_stock))
    }

    /// Removes a line. No-op if the item is not in the cart.
    pub fn remove(&self, item_id: i64) {
        self.session.with_session_mut(|s| s.cart.remove(item_id));
    }

    /// Empties the cart, keeping phone and coupon.
    pub fn clear_cart(&self) {
        self.session.with_session_mut(|s| s.cart.clear());
    }

    /// Subtotal, tax, and total for the current cart.
    pub fn totals(&self) -> DerivedTotals {
        self.session.with_session(|s| DerivedTotals::from(&s.cart))
    }

    /// Number of cart lines.
    pub fn line_count(&self) -> usize {
        self.session.with_session(|s| s.cart.line_count())
    }

    // =========================================================================
    // Transient Inputs
    // =========================================================================

    /// Stores the phone field as typed; normalization happens at commit.
    pub fn set_customer_phone(&self, raw: &str) {
        self.session
            .with_session_mut(|s| s.customer_phone = raw.to_string());
    }

    pub fn customer_phone(&self) -> String {
        self.session.with_session(|s| s.customer_phone.clone())
    }

    /// Stores the coupon field as typed; trimmed at commit.
    pub fn set_coupon_code(&self, raw: &str) {
        self.session
            .with_session_mut(|s| s.coupon_code = raw.to_string());
    }

    pub fn coupon_code(&self) -> String {
        self.session.with_session(|s| s.coupon_code.clone())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Builds the request from the session and hands it to the machine.
    ///
    /// On success, clears the cart and transient inputs, refreshes the
    /// catalog under the current search term, and schedules the machine
    /// reset after the success hold. On rejection, everything is preserved
    /// so the operator can correct and resubmit.
    pub async fn commit(&self) -> SubmitOutcome {
        let (request, lines) = self.session.with_session(|s| {
            let items = s.cart.request_lines();
            let request = match self.kind {
                TransactionKind::Rental => TransactionRequest::Rental {
                    customer_phone: normalize_phone(&s.customer_phone),
                    items,
                },
                _ => TransactionRequest::Sale {
                    items,
                    coupon_code: normalize_coupon(&s.coupon_code),
                },
            };
            (request, s.cart.lines().to_vec())
        });

        let snapshot = self.catalog.snapshot();
        let outcome = self.machine.commit(request, &lines, &snapshot).await;

        if let SubmitOutcome::Committed(record) = &outcome {
            self.session.with_session_mut(|s| s.clear_transients());

            // The committed stock change makes the local snapshot stale;
            // reload under whatever the operator was last searching for.
            let term = self.catalog.last_term();
            self.catalog.refresh(&term).await;

            info!(
                employee = %self.employee.username,
                kind = %self.kind,
                transaction_id = record.id,
                total = %record.total_with_tax,
                "transaction recorded"
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

// =============================================================================
// Workflow Builder
// =============================================================================

/// Builds workflow controllers over a shared API handle.
///
/// ## Example
/// ```rust,ignore
/// let builder = WorkflowBuilder::new(api, employee)
///     .with_events(emitter);
/// let sale = builder.build_sale();
/// sale.enter().await;
/// ```
pub struct WorkflowBuilder {
    api: Arc<dyn TransactionApi>,
    employee: Employee,
    events: Arc<dyn CheckoutEvents>,
    config: WorkflowConfig,
}

impl WorkflowBuilder {
    pub fn new(api: Arc<dyn TransactionApi>, employee: Employee) -> Self {
        WorkflowBuilder {
            api,
            employee,
            events: Arc::new(NoOpEvents),
            config: WorkflowConfig::default(),
        }
    }

    /// Installs an event sink shared by every workflow this builder makes.
    pub fn with_events(mut self, events: Arc<dyn CheckoutEvents>) -> Self {
        self.events = events;
        self
    }

    /// Overrides the timing configuration.
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    fn machine(&self) -> Arc<SubmitMachine> {
        Arc::new(SubmitMachine::new(
            Arc::clone(&self.api),
            Arc::clone(&self.events),
        ))
    }

    fn catalog(&self) -> CatalogCache {
        CatalogCache::new(
            Arc::clone(&self.api),
            CatalogConfig {
                debounce: self.config.debounce,
            },
        )
    }

    fn cart_workflow(&self, kind: TransactionKind) -> CartWorkflow {
        CartWorkflow {
            kind,
            session: SessionState::new(),
            catalog: self.catalog(),
            machine: self.machine(),
            employee: self.employee.clone(),
            success_hold: self.config.success_hold,
        }
    }

    /// A sale screen controller.
    pub fn build_sale(&self) -> CartWorkflow {
        self.cart_workflow(TransactionKind::Sale)
    }

    /// A rental screen controller.
    pub fn build_rental(&self) -> CartWorkflow {
        self.cart_workflow(TransactionKind::Rental)
    }

    /// A returns screen controller.
    pub fn build_returns(&self) -> ReturnsWorkflow {
        ReturnsWorkflow::new(
            Arc::clone(&self.api),
            self.machine(),
            self.employee.clone(),
            self.config.success_hold,
        )
    }
}
