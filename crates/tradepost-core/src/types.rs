//! # Domain Types
//!
//! Core domain types shared by the cart, the catalog snapshot cache, and the
//! submission machine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────────┐  │
//! │  │      Item       │   │TransactionRequest│   │ OutstandingRental   │  │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────────  │  │
//! │  │  id             │   │  Sale            │   │  id (rental record) │  │
//! │  │  legacy_item_id │   │  Rental          │   │  item_id            │  │
//! │  │  name, price    │   │  Return          │   │  rental/due date    │  │
//! │  │  quantity       │   │                  │   │  days_overdue       │  │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────────┐  │
//! │  │    TaxRate      │   │ TransactionKind  │   │     Employee        │  │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────────  │  │
//! │  │  bps (u32)      │   │  Sale            │   │  username           │  │
//! │  │  600 = 6%       │   │  Rental          │   │  position           │  │
//! │  └─────────────────┘   │  Return          │   │  is_active          │  │
//! │                        └──────────────────┘   └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Conventions
//! Field names follow the inventory service's snake_case JSON exactly
//! (`item_id`, `coupon_code`, `customer_phone`, `legacy_item_id`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 600 bps = 6% (the store-wide sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Item
// =============================================================================

/// One catalog SKU's snapshot state as last fetched from the inventory
/// service.
///
/// ## Ownership
/// Owned by the catalog snapshot cache. Immutable once fetched: a refresh
/// replaces the whole snapshot, never patches individual items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Server-issued identifier.
    pub id: i64,

    /// Identifier carried over from the store's previous system; shown to
    /// operators, never used for lookups.
    pub legacy_item_id: i64,

    /// Display name.
    pub name: String,

    /// Unit price (decimal string on the wire).
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub price: Money,

    /// Stock on hand as last reported. May be stale by commit time.
    pub quantity: i64,
}

impl Item {
    /// Checks whether the item has any known stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// The three transaction workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TransactionKind {
    Sale,
    Rental,
    Return,
}

impl TransactionKind {
    /// Returns the REST endpoint path segment for this kind.
    pub const fn endpoint(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::Rental => "rental",
            TransactionKind::Return => "return",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Sale => write!(f, "Sale"),
            TransactionKind::Rental => write!(f, "Rental"),
            TransactionKind::Return => write!(f, "Return"),
        }
    }
}

// =============================================================================
// Transaction Request
// =============================================================================

/// One `{item_id, quantity}` entry of an outgoing Sale or Rental body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    pub item_id: i64,
    pub quantity: i64,
}

/// The commit payload, one variant per transaction workflow.
///
/// ## Wire Shape
/// Serializes untagged, matching the per-endpoint bodies the transaction
/// service expects:
///
/// ```text
/// Sale   → { "items": [{"item_id": 7, "quantity": 2}], "coupon_code": null }
/// Rental → { "customer_phone": "5551234567", "items": [...] }
/// Return → { "customer_phone": "5551234567", "item_ids": [5, 5] }
/// ```
///
/// Note the Return body: `item_ids` keeps one occurrence per selected rental
/// record. Two open rentals of one SKU return two occurrences; the service
/// closes one record per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransactionRequest {
    Sale {
        items: Vec<RequestLine>,
        coupon_code: Option<String>,
    },
    Rental {
        customer_phone: String,
        items: Vec<RequestLine>,
    },
    Return {
        customer_phone: String,
        item_ids: Vec<i64>,
    },
}

impl TransactionRequest {
    /// Returns which workflow this request belongs to.
    pub const fn kind(&self) -> TransactionKind {
        match self {
            TransactionRequest::Sale { .. } => TransactionKind::Sale,
            TransactionRequest::Rental { .. } => TransactionKind::Rental,
            TransactionRequest::Return { .. } => TransactionKind::Return,
        }
    }

    /// Returns the customer phone for kinds that carry one.
    pub fn customer_phone(&self) -> Option<&str> {
        match self {
            TransactionRequest::Sale { .. } => None,
            TransactionRequest::Rental { customer_phone, .. }
            | TransactionRequest::Return { customer_phone, .. } => Some(customer_phone),
        }
    }
}

// =============================================================================
// Transaction Record
// =============================================================================

/// The transaction record the service returns on a successful commit.
///
/// The client treats this as an attribution/display payload only; it never
/// feeds back into cart or stock state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRecord {
    pub id: i64,

    pub transaction_type: TransactionKind,

    /// Username of the committing employee, echoed for attribution.
    pub employee_username: String,

    #[serde(default)]
    pub customer_phone: Option<String>,

    /// Pre-tax total (decimal string on the wire).
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub total_amount: Money,

    /// Total including tax (arrives as a bare JSON number).
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub total_with_tax: Money,

    #[serde(default)]
    pub discount_applied: bool,

    #[serde(default)]
    pub coupon_code: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Outstanding Rental
// =============================================================================

/// A previously committed Rental line item not yet matched by a Return.
///
/// ## Identity
/// Selection identity is `id`, the rental-record id, never `item_id`: a
/// customer may hold multiple concurrent rentals of the same item, each a
/// distinct record.
///
/// All fields are server-reported; the client never computes overdue-ness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutstandingRental {
    pub id: i64,

    pub item_id: i64,

    pub item_name: String,

    #[ts(as = "String")]
    pub rental_date: NaiveDate,

    #[ts(as = "String")]
    pub due_date: NaiveDate,

    #[serde(default)]
    pub days_overdue: i64,

    #[serde(default)]
    pub is_overdue: bool,
}

// =============================================================================
// Employee
// =============================================================================

/// Employee role, as reported by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Position {
    Admin,
    Cashier,
}

impl Position {
    /// Admins additionally see the employee administration screen (outside
    /// this crate's scope). No cart/checkout rule depends on this.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Position::Admin)
    }
}

/// The logged-in employee, consumed read-only for attribution.
///
/// The transaction service derives the committing employee from the session
/// cookie; this struct is never serialized into a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub position: Position,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(600);
        assert_eq!(rate.bps(), 600);
        assert!((rate.percentage() - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_item_deserializes_wire_shape() {
        let json = r#"{
            "id": 7,
            "legacy_item_id": 1007,
            "name": "Ski Poles",
            "price": "10.00",
            "quantity": 2
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.legacy_item_id, 1007);
        assert_eq!(item.price.cents(), 1000);
        assert!(item.in_stock());
    }

    #[test]
    fn test_sale_request_wire_shape() {
        let request = TransactionRequest::Sale {
            items: vec![RequestLine {
                item_id: 7,
                quantity: 2,
            }],
            coupon_code: None,
        };
        assert_eq!(request.kind(), TransactionKind::Sale);
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"items":[{"item_id":7,"quantity":2}],"coupon_code":null}"#
        );
    }

    #[test]
    fn test_rental_request_wire_shape() {
        let request = TransactionRequest::Rental {
            customer_phone: "5551234567".to_string(),
            items: vec![RequestLine {
                item_id: 7,
                quantity: 1,
            }],
        };
        assert_eq!(request.customer_phone(), Some("5551234567"));
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"customer_phone":"5551234567","items":[{"item_id":7,"quantity":1}]}"#
        );
    }

    #[test]
    fn test_return_request_preserves_duplicate_item_ids() {
        let request = TransactionRequest::Return {
            customer_phone: "5551234567".to_string(),
            item_ids: vec![5, 5],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"customer_phone":"5551234567","item_ids":[5,5]}"#
        );
    }

    #[test]
    fn test_transaction_kind_endpoint() {
        assert_eq!(TransactionKind::Sale.endpoint(), "sale");
        assert_eq!(TransactionKind::Rental.endpoint(), "rental");
        assert_eq!(TransactionKind::Return.endpoint(), "return");
    }

    #[test]
    fn test_transaction_record_accepts_float_total() {
        let json = r#"{
            "id": 42,
            "transaction_type": "Rental",
            "employee_username": "jdoe",
            "customer_phone": "5551234567",
            "total_amount": "20.00",
            "total_with_tax": 21.2,
            "discount_applied": false,
            "coupon_code": null,
            "created_at": "2024-03-01T12:00:00Z"
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.transaction_type, TransactionKind::Rental);
        assert_eq!(record.total_amount.cents(), 2000);
        assert_eq!(record.total_with_tax.cents(), 2120);
    }

    #[test]
    fn test_outstanding_rental_defaults() {
        // days_overdue/is_overdue may be absent for rentals not yet due
        let json = r#"{
            "id": 1,
            "item_id": 5,
            "item_name": "Tent",
            "rental_date": "2024-02-20",
            "due_date": "2024-02-27"
        }"#;
        let rental: OutstandingRental = serde_json::from_str(json).unwrap();
        assert_eq!(rental.days_overdue, 0);
        assert!(!rental.is_overdue);
    }

    #[test]
    fn test_position_is_admin() {
        assert!(Position::Admin.is_admin());
        assert!(!Position::Cashier.is_admin());
    }
}
