//! # Tradepost Checkout: Cart and Checkout Consistency Engine
//!
//! The async half of the Tradepost POS client. [`tradepost_core`] holds the
//! pure pieces (money, cart, validation); this crate owns everything with a
//! suspension point or a clock:
//!
//! - [`catalog`]: debounced catalog search with last-write-wins ordering
//! - [`submit`]: the single-flight submission state machine
//! - [`workflow`]: sale and rental screen controllers
//! - [`returns`]: the returns screen controller
//! - [`api`] / [`http`]: the transport seam and its reqwest implementation
//! - [`session`]: shared cart + transient input state
//! - [`error`]: the closed checkout error taxonomy
//!
//! ## Quick Start
//! ```rust,ignore
//! use std::sync::Arc;
//! use tradepost_checkout::{ApiConfig, HttpApi, WorkflowBuilder};
//!
//! let api = Arc::new(HttpApi::new(&ApiConfig::default())?);
//! let sale = WorkflowBuilder::new(api, employee).build_sale();
//! sale.enter().await;
//! sale.search_changed("tent")?;
//! sale.add_to_cart(item_id)?;
//! let outcome = sale.commit().await;
//! ```

pub mod api;
pub mod catalog;
pub mod error;
pub mod http;
pub mod returns;
pub mod session;
pub mod submit;
pub mod workflow;

// Re-export the main public interface
pub use api::{ApiError, ApiResult, TransactionApi};
pub use catalog::{CatalogCache, CatalogConfig};
pub use error::{CheckoutError, CheckoutResult};
pub use http::{ApiConfig, HttpApi};
pub use returns::ReturnsWorkflow;
pub use session::{CheckoutSession, SessionState};
pub use submit::{CheckoutEvents, NoOpEvents, SubmitMachine, SubmitOutcome, SubmitPhase};
pub use workflow::{CartWorkflow, WorkflowBuilder, WorkflowConfig};

/// Initializes the tracing subscriber for an embedding application.
///
/// Honors `RUST_LOG` when set; defaults to info globally with debug for the
/// tradepost crates. Call once at startup.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tradepost_core=debug,tradepost_checkout=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
