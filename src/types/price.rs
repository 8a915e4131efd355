//! Fixed-point price utilities.
//!
//! ## Overview
//!
//! Product prices are stored as `u64` cents (scaled by 10^2) so that a
//! price is exact, never negative, and renders identically on every save.
//! Parsing and formatting go through `rust_decimal`.
//!
//! ## Examples
//!
//! ```
//! use instrument_store::types::price::{to_cents, format_price};
//!
//! let price = to_cents("1200.00").unwrap();
//! assert_eq!(price, 120_000);
//! assert_eq!(format_price(price), "1200.00");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// Scaling factor: prices are whole cents
pub const SCALE: u64 = 100;

/// Number of decimal places rendered for a price
pub const DECIMAL_PLACES: u32 = 2;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to cents
///
/// Surrounding whitespace is ignored. Values with more than two decimal
/// places are rounded to the nearest cent, half a cent rounding up.
///
/// # Returns
///
/// * `Some(u64)` - The price in cents
/// * `None` - If parsing fails, the value is negative, or out of range
///
/// # Example
///
/// ```
/// use instrument_store::types::price::to_cents;
///
/// assert_eq!(to_cents("300"), Some(30_000));
/// assert_eq!(to_cents("0.99"), Some(99));
/// assert_eq!(to_cents("-1"), None);
/// ```
pub fn to_cents(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_cents(decimal)
}

/// Convert a Decimal to cents
///
/// # Returns
///
/// * `Some(u64)` - The price in cents
/// * `None` - If value is negative or out of range
pub fn decimal_to_cents(d: Decimal) -> Option<u64> {
    if d.is_zero() {
        return Some(0);
    }
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

/// Convert cents to a Decimal
pub fn cents_to_decimal(cents: u64) -> Decimal {
    Decimal::from(cents) / Decimal::from(SCALE)
}

/// Render cents with exactly two decimal places
///
/// # Example
///
/// ```
/// use instrument_store::types::price::format_price;
///
/// assert_eq!(format_price(30_000), "300.00");
/// assert_eq!(format_price(5), "0.05");
/// ```
pub fn format_price(cents: u64) -> String {
    let decimal = cents_to_decimal(cents);
    format!("{:.2}", decimal)
}

// ============================================================================
// Unit Tests
// ============================================================================
