//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! decimal wire codec for the inventory service's `"12.34"` price strings.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every monetary value is an i64 count of cents. Arithmetic is        │
//! │    exact; rounding happens once, at the tax step, explicitly.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Wire Problem
//! The inventory service serializes prices as decimal strings (`"12.34"`)
//! and derived totals as bare JSON numbers. The [`decimal`] serde module
//! translates both to cents on the way in and emits strings on the way out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;
use crate::validation::ValidationResult;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tradepost_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow: `(cents * bps + 5000) / 10000`.
    /// The `+ 5000` rounds half up at the final step; no intermediate rounding
    /// ever occurs.
    ///
    /// ## Example
    /// ```rust
    /// use tradepost_core::money::Money;
    /// use tradepost_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2000); // $20.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(600)); // 6%
    /// assert_eq!(tax.cents(), 120); // $1.20
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tradepost_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000); // $10.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 2000); // $20.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a decimal string (`"12.34"`, `"5"`, `"-0.50"`) into cents.
    ///
    /// ## Rules
    /// - At most two fractional digits (the wire format is cents-precision)
    /// - A missing fraction means whole dollars (`"5"` = 500 cents)
    /// - Leading/trailing whitespace is ignored
    ///
    /// ## Example
    /// ```rust
    /// use tradepost_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.34").unwrap().cents(), 1234);
    /// assert_eq!(Money::parse_decimal("12.3").unwrap().cents(), 1230);
    /// assert_eq!(Money::parse_decimal("12").unwrap().cents(), 1200);
    /// assert!(Money::parse_decimal("12.345").is_err());
    /// ```
    pub fn parse_decimal(text: &str) -> ValidationResult<Money> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let text = text.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        if unsigned.is_empty() {
            return Err(invalid("empty value"));
        }

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };

        if frac.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a decimal number"));
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value out of range"))?
        };

        // Right-pad the fraction: "3" means 30 cents, not 3.
        let minor: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("not a decimal number"))? * 10,
            _ => frac.parse().map_err(|_| invalid("not a decimal number"))?,
        };

        let cents = dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("value out of range"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Formats the value as a bare decimal string (`"12.34"`), the shape the
    /// wire codec emits. [`fmt::Display`] adds the currency symbol instead.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Decimal Wire Codec
// =============================================================================

/// Serde codec for decimal-string money fields.
///
/// ## Usage
/// ```rust,ignore
/// #[serde(with = "crate::money::decimal")]
/// pub price: Money,
/// ```
///
/// Accepts both `"12.34"` strings (DecimalField serialization) and bare JSON
/// numbers (the service computes `total_with_tax` as a float). Always emits
/// the string form.
pub mod decimal {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&money.to_decimal_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Money::parse_decimal(&text).map_err(serde::de::Error::custom),
            Raw::Number(value) => Ok(Money::from_cents((value * 100.0).round() as i64)),
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_at_sales_rate() {
        // $20.00 at 6% = $1.20, exact
        let amount = Money::from_cents(2000);
        let tax = amount.calculate_tax(TaxRate::from_bps(600));
        assert_eq!(tax.cents(), 120);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.99 at 6% = $0.6594 → $0.66 (rounds half up at the final step)
        let amount = Money::from_cents(1099);
        let tax = amount.calculate_tax(TaxRate::from_bps(600));
        assert_eq!(tax.cents(), 66);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("12.34").unwrap().cents(), 1234);
        assert_eq!(Money::parse_decimal("12.3").unwrap().cents(), 1230);
        assert_eq!(Money::parse_decimal("12").unwrap().cents(), 1200);
        assert_eq!(Money::parse_decimal("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse_decimal("-5.50").unwrap().cents(), -550);
        assert_eq!(Money::parse_decimal(" 10.00 ").unwrap().cents(), 1000);

        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("12.345").is_err());
        assert!(Money::parse_decimal("abc").is_err());
        assert!(Money::parse_decimal("12.3a").is_err());
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(1234).to_decimal_string(), "12.34");
        assert_eq!(Money::from_cents(500).to_decimal_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    }

    #[test]
    fn test_decimal_codec_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "super::decimal")]
            amount: Money,
        }

        // String form in, string form out
        let parsed: Wrapper = serde_json::from_str(r#"{"amount":"12.34"}"#).unwrap();
        assert_eq!(parsed.amount.cents(), 1234);
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"amount":"12.34"}"#
        );

        // Bare numbers are accepted on input (total_with_tax arrives as a float)
        let parsed: Wrapper = serde_json::from_str(r#"{"amount":21.2}"#).unwrap();
        assert_eq!(parsed.amount.cents(), 2120);
    }
}
