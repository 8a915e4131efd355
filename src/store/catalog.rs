//! Product catalog: one product slab indexed by two trees.
//!
//! ## Architecture
//!
//! - **Slab**: owns every `Product` record
//! - **Name index**: `ProductTree` ordered by case-insensitive name (unique)
//! - **Type index**: `ProductTree` ordered by case-insensitive type, then name
//!
//! Both trees hold slab keys, so a product's field values are identical
//! through either index by construction. The trees are private: every
//! mutation goes through `add_product`, `update_product` or
//! `remove_product`, which touch both trees in one call.
//!
//! ## Example
//!
//! ```
//! use instrument_store::store::ProductCatalog;
//! use instrument_store::types::Product;
//!
//! let mut catalog = ProductCatalog::new();
//! catalog.add_product(Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Student tuba")).unwrap();
//! catalog.add_product(Product::new("Flute", "Woodwind", 30_000, "Gemeinhardt", 5, "Beginner flute")).unwrap();
//!
//! assert_eq!(catalog.search_by_type("brass").unwrap().name, "Tuba");
//! let names: Vec<_> = catalog.products_by_name().iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["Flute", "Tuba"]);
//! ```

use std::cmp::Ordering;
use std::collections::VecDeque;

use slab::Slab;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::tree::ProductTree;
use crate::types::{cmp_ignore_case, Product, ProductUpdate};

fn name_order(a: &Product, b: &Product) -> Ordering {
    cmp_ignore_case(&a.name, &b.name)
}

fn type_order(a: &Product, b: &Product) -> Ordering {
    b.cmp_type_then_name(&a.kind, &a.name)
}

/// Product catalog with a primary (name) and secondary (type) index.
#[derive(Debug)]
pub struct ProductCatalog {
    /// Product storage, keyed by slab index
    products: Slab<Product>,

    /// Primary index: unique, case-insensitive name
    by_name: ProductTree,

    /// Secondary index: type, with name as tie-break
    by_type: ProductTree,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a catalog with pre-allocated product storage
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            products: Slab::with_capacity(capacity),
            by_name: ProductTree::new(name_order),
            by_type: ProductTree::new(type_order),
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Heights of the (name, type) trees
    pub fn heights(&self) -> (usize, usize) {
        (self.by_name.height(), self.by_type.height())
    }

    // ========================================================================
    // Mutations (both indices in one step)
    // ========================================================================

    /// Add a product to both indices.
    ///
    /// # Errors
    ///
    /// `ProductExists` if a product with the same name (ignoring case) is
    /// already in the catalog. Nothing is changed in that case.
    pub fn add_product(&mut self, product: Product) -> Result<()> {
        if self.contains(&product.name) {
            return Err(StoreError::ProductExists(product.name));
        }

        let key = self.products.insert(product);
        let by_name = self.by_name.insert(key, &self.products);
        let by_type = self.by_type.insert(key, &self.products);
        debug_assert!(by_name && by_type, "indices diverged on insert");

        let product = &self.products[key];
        debug!(name = %product.name, kind = %product.kind, "product added");
        Ok(())
    }

    /// Add products that are already in ascending name order, median first,
    /// so that both trees come out about log2(n) deep instead of forming a
    /// spine.
    ///
    /// Unsorted input is still indexed correctly; only the shape suffers.
    ///
    /// # Errors
    ///
    /// `ProductExists` for the first name already present. Products placed
    /// before it stay in the catalog.
    pub fn extend_balanced(&mut self, products: Vec<Product>) -> Result<usize> {
        let mut slots: Vec<Option<Product>> = products.into_iter().map(Some).collect();
        let mut ranges = VecDeque::from([(0, slots.len())]);
        let mut added = 0;

        while let Some((lo, hi)) = ranges.pop_front() {
            if lo >= hi {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            if let Some(product) = slots[mid].take() {
                self.add_product(product)?;
                added += 1;
            }
            ranges.push_back((lo, mid));
            ranges.push_back((mid + 1, hi));
        }
        Ok(added)
    }

    /// Change a non-key field of an existing product in place.
    ///
    /// Neither tree is reordered: name and type are never touched.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if no product has this name
    /// - `StockOverflow` if adding stock would overflow the quantity
    pub fn update_product(&mut self, name: &str, update: ProductUpdate) -> Result<&Product> {
        let key = self
            .name_key(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;
        let product = &mut self.products[key];

        match update {
            ProductUpdate::Price(price) => product.price = price,
            ProductUpdate::Description(description) => product.description = description,
            ProductUpdate::AddStock(extra) => {
                product.quantity = product.quantity.checked_add(extra).ok_or_else(|| {
                    StoreError::StockOverflow {
                        name: product.name.clone(),
                        requested: extra,
                    }
                })?;
            }
        }

        debug!(name = %product.name, "product updated");
        Ok(product)
    }

    /// Remove a product from both indices and return it.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` if no product has this name.
    pub fn remove_product(&mut self, name: &str) -> Result<Product> {
        let key = self
            .name_key(name)
            .ok_or_else(|| StoreError::ProductNotFound(name.to_string()))?;

        let (kind, stored_name) = {
            let product = &self.products[key];
            (product.kind.clone(), product.name.clone())
        };

        let from_name = self
            .by_name
            .remove(&self.products, |p| p.cmp_name(&stored_name));
        let from_type = self
            .by_type
            .remove(&self.products, |p| p.cmp_type_then_name(&kind, &stored_name));
        debug_assert_eq!(from_name, Some(key));
        debug_assert_eq!(from_type, Some(key));

        let product = self.products.remove(key);
        debug!(name = %product.name, "product removed");
        Ok(product)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Whether a product with this name (ignoring case) exists
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.name_key(name).is_some()
    }

    /// Exact lookup by name, ignoring case
    pub fn search_by_name(&self, name: &str) -> Option<&Product> {
        self.name_key(name).map(|key| &self.products[key])
    }

    /// First product of this type met while descending the type index.
    ///
    /// When several products share the type only one of them is returned,
    /// and which one depends on the tree's shape.
    pub fn search_by_type(&self, kind: &str) -> Option<&Product> {
        self.by_type
            .find(&self.products, |p| cmp_ignore_case(kind, &p.kind))
            .map(|key| &self.products[key])
    }

    /// All products, ascending by name
    pub fn products_by_name(&self) -> Vec<&Product> {
        self.resolve(self.by_name.in_order())
    }

    /// All products, ascending by type and then by name
    pub fn products_by_type(&self) -> Vec<&Product> {
        self.resolve(self.by_type.in_order())
    }

    /// Check that both indices hold exactly the stored products, each in
    /// strictly ascending order.
    pub fn is_consistent(&self) -> bool {
        let mut by_name = self.by_name.in_order();
        let mut by_type = self.by_type.in_order();

        let name_sorted = by_name
            .windows(2)
            .all(|w| name_order(&self.products[w[0]], &self.products[w[1]]) == Ordering::Less);
        let type_sorted = by_type
            .windows(2)
            .all(|w| type_order(&self.products[w[0]], &self.products[w[1]]) == Ordering::Less);

        by_name.sort_unstable();
        by_type.sort_unstable();
        let stored: Vec<usize> = self.products.iter().map(|(key, _)| key).collect();

        name_sorted
            && type_sorted
            && by_name == by_type
            && by_name == stored
            && self.by_name.len() == self.products.len()
            && self.by_type.len() == self.products.len()
    }

    fn name_key(&self, name: &str) -> Option<usize> {
        self.by_name.find(&self.products, |p| p.cmp_name(name))
    }

    fn resolve(&self, keys: Vec<usize>) -> Vec<&Product> {
        keys.into_iter().map(|key| &self.products[key]).collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
