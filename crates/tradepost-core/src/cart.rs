//! # Cart Module
//!
//! The cart manager and the pricing calculator.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Operator Action           Cart Manager              State Change       │
//! │  ───────────────           ────────────              ────────────       │
//! │                                                                         │
//! │  Click item ─────────────► add(item) ──────────────► line qty += 1     │
//! │                              │                        (or new line)     │
//! │                              └── past known stock? ─► InsufficientStock │
//! │                                                                         │
//! │  Edit quantity ──────────► set_quantity(id, n) ────► line qty = n      │
//! │                              ├── n <= 0 ───────────► line removed      │
//! │                              └── n > ceiling ──────► InsufficientStock │
//! │                                                                         │
//! │  Click remove ───────────► remove(id) ─────────────► line removed      │
//! │                                                                         │
//! │  Commit succeeded ───────► clear() ────────────────► cart emptied      │
//! │                                                                         │
//! │  Every rejected mutation leaves the cart untouched.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one [`CartLine`] per item id; re-adding increments instead
//! - `line.quantity <= known item.quantity` at the moment of every mutation
//!   (the snapshot can still go stale before commit; the submit machine
//!   re-checks)
//! - Totals are a pure projection, recomputed per call, never cached

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Item, RequestLine};
use crate::SALES_TAX;

// =============================================================================
// Cart Line
// =============================================================================

/// One entry of the cart: a frozen item snapshot plus a quantity.
///
/// ## Price Freezing
/// The item is cloned at add time, so the cart displays consistent data even
/// if a catalog refresh changes the price underneath. Stock ceilings always
/// consult the *current* snapshot, not this frozen copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Item state at the moment it was added (frozen).
    pub item: Item,

    /// Quantity in the cart, always >= 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line for an item entering the cart.
    pub fn from_item(item: &Item) -> Self {
        CartLine {
            item: item.clone(),
            quantity: 1,
        }
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.item.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The working set of selected items and quantities.
///
/// Lines keep insertion order; order matters only for display, never for
/// correctness.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of an item, or increments its existing line.
    ///
    /// `item` is the entry from the *current* catalog snapshot, so
    /// `item.quantity` is the stock ceiling.
    ///
    /// ## Errors
    /// - [`CoreError::OutOfStock`] if the item has no known stock
    /// - [`CoreError::InsufficientStock`] if incrementing would pass the
    ///   ceiling; the line is left unchanged
    pub fn add(&mut self, item: &Item) -> CoreResult<()> {
        if item.quantity <= 0 {
            return Err(CoreError::OutOfStock {
                name: item.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            let requested = line.quantity + 1;
            if requested > item.quantity {
                return Err(CoreError::InsufficientStock {
                    name: item.name.clone(),
                    available: item.quantity,
                    requested,
                });
            }
            line.quantity = requested;
            return Ok(());
        }

        self.lines.push(CartLine::from_item(item));
        Ok(())
    }

    /// Replaces a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity <= 0` removes the line (no error, even when absent)
    /// - `known_stock` is the item's quantity in the current snapshot;
    ///   `None` means the item has left the (search-filtered) snapshot and
    ///   the line's frozen quantity is the last known truth
    ///
    /// ## Errors
    /// - [`CoreError::NotInCart`] if no line exists for the item
    /// - [`CoreError::InsufficientStock`] if `quantity` exceeds the ceiling;
    ///   the line is left unchanged
    pub fn set_quantity(
        &mut self,
        item_id: i64,
        quantity: i64,
        known_stock: Option<i64>,
    ) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(item_id);
            return Ok(());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item.id == item_id)
            .ok_or(CoreError::NotInCart(item_id))?;

        let ceiling = known_stock.unwrap_or(line.item.quantity);
        if quantity > ceiling {
            return Err(CoreError::InsufficientStock {
                name: line.item.name.clone(),
                available: ceiling,
                requested: quantity,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by item id. Silent no-op when absent.
    pub fn remove(&mut self, item_id: i64) {
        self.lines.retain(|l| l.item.id != item_id);
    }

    /// Empties the cart. Called after a successful commit.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for an item id.
    pub fn line(&self, item_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item.id == item_id)
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Projects the lines into the outgoing request shape.
    pub fn request_lines(&self) -> Vec<RequestLine> {
        self.lines
            .iter()
            .map(|l| RequestLine {
                item_id: l.item.id,
                quantity: l.quantity,
            })
            .collect()
    }

    // =========================================================================
    // Pricing Calculator
    // =========================================================================
    // Pure, deterministic, O(line count). Recomputed on every call; an empty
    // cart yields all zeros.

    /// Calculates the subtotal (before tax).
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Money::zero(), |acc, total| acc + total)
    }

    /// Calculates the tax: `subtotal × 6%`, rounded once at the final step.
    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(SALES_TAX)
    }

    /// Calculates the grand total (subtotal + tax).
    pub fn total(&self) -> Money {
        self.subtotal() + self.tax()
    }

    /// Projects all three totals at once.
    pub fn totals(&self) -> DerivedTotals {
        DerivedTotals::from(self)
    }
}

// =============================================================================
// Derived Totals
// =============================================================================

/// Totals summary handed to the UI shell.
///
/// Never stored: always recomputed from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DerivedTotals {
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub subtotal: Money,

    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub tax: Money,

    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub total: Money,
}

impl From<&Cart> for DerivedTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let tax = subtotal.calculate_tax(SALES_TAX);
        DerivedTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
