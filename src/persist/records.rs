//! Record codecs: one line per user, product or order.
//!
//! ## Formats
//!
//! ```text
//! users:    username,password,firstName,lastName
//! products: name,type,price,brand,quantityInStock,description
//! orders:   orderID,username,productName,shippingMethod
//! ```
//!
//! Text fields are taken verbatim. Numeric fields and the shipping method
//! are parsed strictly; a failure is reported as
//! [`StoreError::MalformedField`] with the file and line it came from.

use std::path::Path;

use crate::error::{Result, StoreError};
use crate::types::price::{format_price, to_cents};
use crate::types::{Order, Product, Role, ShippingMethod, User};

pub const USER_FIELDS: usize = 4;
pub const PRODUCT_FIELDS: usize = 6;
pub const ORDER_FIELDS: usize = 4;

pub const USER_HEADER: &str = "# Format: username,password,firstName,lastName";
pub const PRODUCT_HEADER: &str =
    "# Format: instrumentName, instrumentType, price, brand, quantityInStock, description";
pub const ORDER_HEADER: &str = "# Format: orderID,username,productName,shippingMethod";

/// Where a record came from, for error reporting
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    pub file: &'a Path,
    pub line: u64,
}

impl Location<'_> {
    fn malformed(&self, field: &'static str, value: &str) -> StoreError {
        StoreError::MalformedField {
            file: self.file.to_path_buf(),
            line: self.line,
            field,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Build a user from `[username, password, first, last]`
pub fn decode_user(role: Role, fields: &[&str; USER_FIELDS]) -> User {
    let [username, password, first, last] = *fields;
    User::new(role, username, password, first, last)
}

/// Build a product from `[name, type, price, brand, quantity, description]`
pub fn decode_product(fields: &[&str; PRODUCT_FIELDS], at: Location<'_>) -> Result<Product> {
    let [name, kind, price, brand, quantity, description] = *fields;

    let price = to_cents(price).ok_or_else(|| at.malformed("price", price))?;
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| at.malformed("quantityInStock", quantity))?;

    Ok(Product::new(name, kind, price, brand, quantity, description))
}

/// Build an unshipped order from `[id, username, product, method]`
pub fn decode_order(fields: &[&str; ORDER_FIELDS], at: Location<'_>) -> Result<Order> {
    let [id, username, product_name, method] = *fields;

    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|_| at.malformed("orderID", id))?;
    let method = method
        .parse::<ShippingMethod>()
        .map_err(|_| at.malformed("shippingMethod", method))?;

    Ok(Order::new(id, username, product_name, method))
}

// ============================================================================
// Encoding
// ============================================================================

pub fn encode_user(user: &User) -> [&str; USER_FIELDS] {
    [
        user.username.as_str(),
        user.password.as_str(),
        user.first_name.as_str(),
        user.last_name.as_str(),
    ]
}

pub fn encode_product(product: &Product) -> [String; PRODUCT_FIELDS] {
    [
        product.name.clone(),
        product.kind.clone(),
        format_price(product.price),
        product.brand.clone(),
        product.quantity.to_string(),
        product.description.clone(),
    ]
}

/// The shipped flag is not written; reloaded orders start unshipped
pub fn encode_order(order: &Order) -> [String; ORDER_FIELDS] {
    [
        order.id.to_string(),
        order.username.clone(),
        order.product_name.clone(),
        order.shipping_method.as_str().to_string(),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u64) -> Location<'static> {
        Location {
            file: Path::new("test.txt"),
            line,
        }
    }

    #[test]
    fn test_decode_user() {
        let user = decode_user(Role::Employee, &["ed", "pw", "Ed", "Stone"]);
        assert_eq!(user, User::new(Role::Employee, "ed", "pw", "Ed", "Stone"));
        assert_eq!(encode_user(&user), ["ed", "pw", "Ed", "Stone"]);
    }

    #[test]
    fn test_decode_product() {
        let product = decode_product(
            &["Tuba", "Brass", "1200.00", "Yamaha", "3", "Student tuba"],
            at(1),
        )
        .unwrap();

        assert_eq!(product.price, 120_000);
        assert_eq!(product.quantity, 3);
        assert_eq!(
            encode_product(&product),
            ["Tuba", "Brass", "1200.00", "Yamaha", "3", "Student tuba"].map(String::from)
        );
    }

    #[test]
    fn test_decode_product_accepts_short_price() {
        // Older files were written with a single decimal place
        let product =
            decode_product(&["Flute", "Woodwind", "300.0", "Gem", "5", "Flute"], at(1)).unwrap();
        assert_eq!(product.price, 30_000);
    }

    #[test]
    fn test_decode_product_bad_price() {
        let err = decode_product(&["Tuba", "Brass", "cheap", "Yamaha", "3", "x"], at(7))
            .unwrap_err();

        match err {
            StoreError::MalformedField { line, field, value, .. } => {
                assert_eq!(line, 7);
                assert_eq!(field, "price");
                assert_eq!(value, "cheap");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_product_bad_quantity() {
        let err = decode_product(&["Tuba", "Brass", "1", "Yamaha", "-3", "x"], at(2))
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedField { field: "quantityInStock", .. }));
    }

    #[test]
    fn test_decode_order() {
        let order = decode_order(&["1001", "alice", "Tuba", "rush"], at(1)).unwrap();

        assert_eq!(order.id, 1001);
        assert_eq!(order.shipping_method, ShippingMethod::Rush);
        assert!(!order.shipped);
        assert_eq!(encode_order(&order), ["1001", "alice", "Tuba", "RUSH"].map(String::from));
    }

    #[test]
    fn test_decode_order_bad_fields() {
        let err = decode_order(&["x1", "alice", "Tuba", "RUSH"], at(1)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedField { field: "orderID", .. }));

        let err = decode_order(&["1001", "alice", "Tuba", "TELEPORT"], at(1)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedField { field: "shippingMethod", .. }));
    }

    #[test]
    fn test_encode_order_drops_shipped_flag() {
        let mut order = Order::new(1001, "alice", "Tuba", ShippingMethod::Overnight);
        order.shipped = true;
        assert_eq!(encode_order(&order)[3], "OVERNIGHT");
        assert_eq!(encode_order(&order).len(), ORDER_FIELDS);
    }
}
