//! Order types for the store.
//!
//! ## Priority
//!
//! Unshipped orders are served by shipping method:
//! - OVERNIGHT = 3 (shipped first)
//! - RUSH = 2
//! - STANDARD = 1

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// First order ID is `ORDER_ID_BASE + 1`
pub const ORDER_ID_BASE: u32 = 1000;

// ============================================================================
// ShippingMethod enum
// ============================================================================

/// Shipping method chosen when the order is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShippingMethod {
    Overnight,
    Rush,
    #[default]
    Standard,
}

impl ShippingMethod {
    /// Heap priority: higher ships first
    #[inline]
    pub fn priority(self) -> u8 {
        match self {
            ShippingMethod::Overnight => 3,
            ShippingMethod::Rush => 2,
            ShippingMethod::Standard => 1,
        }
    }

    /// Upper-case name used in the orders file
    pub fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Overnight => "OVERNIGHT",
            ShippingMethod::Rush => "RUSH",
            ShippingMethod::Standard => "STANDARD",
        }
    }

    /// Map a numbered menu choice: 1 = overnight, 2 = rush, anything else
    /// falls back to standard.
    pub fn from_choice(choice: u8) -> Self {
        match choice {
            1 => ShippingMethod::Overnight,
            2 => ShippingMethod::Rush,
            _ => ShippingMethod::Standard,
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = StoreError;

    /// Case-insensitive parse of the method name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OVERNIGHT" => Ok(ShippingMethod::Overnight),
            "RUSH" => Ok(ShippingMethod::Rush),
            "STANDARD" => Ok(ShippingMethod::Standard),
            _ => Err(StoreError::InvalidShippingMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A customer order.
///
/// `username` and `product_name` are plain references by key: the product
/// may be removed from the catalog after the order is placed.
///
/// ## Example
///
/// ```
/// use instrument_store::types::{Order, ShippingMethod};
///
/// let order = Order::new(1001, "alice", "Tuba", ShippingMethod::Rush);
/// assert_eq!(order.priority(), 2);
/// assert!(!order.shipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique order identifier
    pub id: u32,

    /// Who placed the order
    pub username: String,

    /// What was ordered
    pub product_name: String,

    pub shipping_method: ShippingMethod,

    /// Set once, when the order leaves the priority queue
    pub shipped: bool,
}

impl Order {
    /// Create a new, unshipped order
    pub fn new(
        id: u32,
        username: impl Into<String>,
        product_name: impl Into<String>,
        shipping_method: ShippingMethod,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            product_name: product_name.into(),
            shipping_method,
            shipped: false,
        }
    }

    /// Priority derived from the shipping method
    #[inline]
    pub fn priority(&self) -> u8 {
        self.shipping_method.priority()
    }

    /// Whether this order belongs to `username` (exact match)
    #[inline]
    pub fn is_for(&self, username: &str) -> bool {
        self.username == username
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrderID={}, User={}, Product={}, Shipping={}, Shipped={}",
            self.id, self.username, self.product_name, self.shipping_method, self.shipped
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
