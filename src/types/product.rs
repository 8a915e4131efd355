//! Product records and the case-insensitive key comparisons used by both
//! catalog indices.

use std::cmp::Ordering;
use std::fmt;

use crate::types::price::format_price;

/// Compare two strings ignoring case, character by character.
///
/// ```
/// use std::cmp::Ordering;
/// use instrument_store::types::cmp_ignore_case;
///
/// assert_eq!(cmp_ignore_case("tuba", "TUBA"), Ordering::Equal);
/// assert_eq!(cmp_ignore_case("Flute", "tuba"), Ordering::Less);
/// ```
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// A catalog product.
///
/// `name` is the primary key (unique ignoring case); `kind` is the
/// instrument type, a non-unique secondary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,

    /// Instrument type, e.g. "Brass"
    pub kind: String,

    /// Price in cents
    pub price: u64,

    pub brand: String,

    pub quantity: u32,

    pub description: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        price: u64,
        brand: impl Into<String>,
        quantity: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            price,
            brand: brand.into(),
            quantity,
            description: description.into(),
        }
    }

    /// Name-index ordering
    #[inline]
    pub fn cmp_name(&self, name: &str) -> Ordering {
        cmp_ignore_case(name, &self.name)
    }

    /// Type-index ordering: type first, name breaks ties
    pub fn cmp_type_then_name(&self, kind: &str, name: &str) -> Ordering {
        cmp_ignore_case(kind, &self.kind).then_with(|| cmp_ignore_case(name, &self.name))
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Name={}, Type={}, Brand={}, Price={}, Qty={}, Desc={}]",
            self.name,
            self.kind,
            self.brand,
            format_price(self.price),
            self.quantity,
            self.description
        )
    }
}

/// In-place change to a product's non-key fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductUpdate {
    /// Replace the price (cents)
    Price(u64),
    Description(String),
    /// Add units to the current stock
    AddStock(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuba() -> Product {
        Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Student tuba")
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("abc", "ABC"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("abc", "ABD"), Ordering::Less);
        assert_eq!(cmp_ignore_case("b", "A"), Ordering::Greater);
        assert_eq!(cmp_ignore_case("ab", "ABC"), Ordering::Less);
    }

    #[test]
    fn test_cmp_name_orders_query_first() {
        let p = tuba();
        assert_eq!(p.cmp_name("tuba"), Ordering::Equal);
        assert_eq!(p.cmp_name("Flute"), Ordering::Less);
        assert_eq!(p.cmp_name("Violin"), Ordering::Greater);
    }

    #[test]
    fn test_cmp_type_then_name() {
        let p = tuba();
        assert_eq!(p.cmp_type_then_name("brass", "TUBA"), Ordering::Equal);
        assert_eq!(p.cmp_type_then_name("Brass", "Trumpet"), Ordering::Less);
        assert_eq!(p.cmp_type_then_name("Woodwind", "Flute"), Ordering::Greater);
    }

    #[test]
    fn test_display_formats_price() {
        assert_eq!(
            tuba().to_string(),
            "[Name=Tuba, Type=Brass, Brand=Yamaha, Price=1200.00, Qty=3, Desc=Student tuba]"
        );
    }
}
