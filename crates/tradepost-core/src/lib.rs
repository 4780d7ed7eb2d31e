//! # tradepost-core: Pure Business Logic for the Tradepost POS Client
//!
//! This crate is the **heart** of the checkout engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Tradepost Client Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       UI Shell (external)                       │   │
//! │  │    Search UI ──► Cart UI ──► Checkout UI ──► Returns UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   tradepost-checkout                            │   │
//! │  │    Catalog cache, submit machine, workflows, HTTP transport     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tradepost-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │ Requests  │  │  TaxCalc  │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, TransactionRequest, OutstandingRental, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart manager and derived totals
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, file system, and timer access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tradepost_core::money::Money;
//! use tradepost_core::SALES_TAX;
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(2000); // $20.00
//!
//! // 6% sales tax on $20.00 = $1.20
//! let tax = subtotal.calculate_tax(SALES_TAX);
//! assert_eq!(tax.cents(), 120);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tradepost_core::Money` instead of
// `use tradepost_core::money::Money`

pub use cart::{Cart, CartLine, DerivedTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use validation::{
    normalize_coupon, normalize_phone, validate_customer_phone, validate_lookup_phone,
    validate_search_query, ValidationResult,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed sales tax rate applied to every transaction: 600 bps = 6%.
///
/// ## Why a constant?
/// The tax rate is a store-wide policy mirrored by the inventory service;
/// the client never receives it over the wire and never varies it per item.
pub const SALES_TAX: TaxRate = TaxRate::from_bps(600);

/// Maximum length of a catalog search term.
///
/// ## Business Reason
/// Prevents pathological search queries from reaching the inventory service.
pub const MAX_SEARCH_LEN: usize = 100;
