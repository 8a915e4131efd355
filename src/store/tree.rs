//! Unbalanced binary search tree over product slab keys.
//!
//! ## Design
//!
//! A `ProductTree` never stores products itself. Each node holds the slab
//! key of a product owned by the catalog, and every comparison resolves the
//! key through the `&Slab<Product>` passed into the call. Two trees built
//! with different orderings can therefore index the same records, and an
//! in-place edit of a non-key field is visible through both.
//!
//! ## Ownership
//!
//! Each node exclusively owns its subtrees (`Option<Box<Node>>`); there is
//! no sharing and no parent pointer.
//!
//! ## Shape
//!
//! No rebalancing is performed. Height is O(log n) for random insertion
//! order and O(n) for sorted insertion order. Every walk (insert, search,
//! removal, traversal, drop) is a loop over an explicit cursor or stack, so
//! a degenerate tree costs time but never call-stack depth.

use std::cmp::Ordering;

use slab::Slab;

use crate::types::Product;

/// Total order between two stored products
pub type ProductOrder = fn(&Product, &Product) -> Ordering;

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    /// Slab key of the product at this node
    key: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn new(key: usize) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree of product keys ordered by `order`.
#[derive(Debug)]
pub struct ProductTree {
    root: Link,
    order: ProductOrder,
    len: usize,
}

impl ProductTree {
    /// Create an empty tree using `order` to place products
    pub fn new(order: ProductOrder) -> Self {
        Self {
            root: None,
            order,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert the product stored at `key`.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if a product comparing equal under this
    /// tree's order is already present.
    pub fn insert(&mut self, key: usize, products: &Slab<Product>) -> bool {
        let incoming = &products[key];
        let mut slot = &mut self.root;

        while let Some(node) = slot {
            match (self.order)(incoming, &products[node.key]) {
                Ordering::Less => slot = &mut node.left,
                Ordering::Greater => slot = &mut node.right,
                Ordering::Equal => return false,
            }
        }

        *slot = Some(Box::new(Node::new(key)));
        self.len += 1;
        true
    }

    /// Descend from the root and return the first key whose product
    /// compares `Equal` under `target`.
    ///
    /// `target(p)` must return the ordering of the searched value relative
    /// to `p`. A target that compares only part of the tree's key (e.g. type
    /// without name) stops at the first partial match on the path.
    pub fn find<F>(&self, products: &Slab<Product>, target: F) -> Option<usize>
    where
        F: Fn(&Product) -> Ordering,
    {
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            match target(&products[node.key]) {
                Ordering::Equal => return Some(node.key),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }

        None
    }

    /// Remove the node matching `target` and return its key.
    ///
    /// Leaf and single-child nodes are spliced out. A node with two
    /// children takes over its in-order successor's key and the successor
    /// node is unlinked from the right subtree instead.
    pub fn remove<F>(&mut self, products: &Slab<Product>, target: F) -> Option<usize>
    where
        F: Fn(&Product) -> Ordering,
    {
        // Directions to the match (true = left), then a mutable walk down them
        let mut path = Vec::new();
        let mut current = self.root.as_deref();
        loop {
            let node = current?;
            match target(&products[node.key]) {
                Ordering::Equal => break,
                Ordering::Less => {
                    path.push(true);
                    current = node.left.as_deref();
                }
                Ordering::Greater => {
                    path.push(false);
                    current = node.right.as_deref();
                }
            }
        }

        let removed = splice(descend(&mut self.root, &path)?)?;
        self.len -= 1;
        Some(removed)
    }

    /// Keys in ascending order (left, node, right)
    pub fn in_order(&self) -> Vec<usize> {
        let mut keys = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = Vec::new();
        let mut current = self.root.as_deref();

        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            keys.push(node.key);
            current = node.right.as_deref();
        }
        keys
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&Node, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();

        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        height
    }
}

impl Drop for ProductTree {
    fn drop(&mut self) {
        // Unlink node by node so a long spine does not recurse
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Follow `path` (true = left) from `slot` down to the link to unlink
fn descend<'a>(mut slot: &'a mut Link, path: &[bool]) -> Option<&'a mut Link> {
    for &left in path {
        slot = match slot {
            Some(node) => {
                if left {
                    &mut node.left
                } else {
                    &mut node.right
                }
            }
            None => return None,
        };
    }
    Some(slot)
}

/// Unlink the node held by `slot`, returning its key
fn splice(slot: &mut Link) -> Option<usize> {
    let mut node = slot.take()?;
    let removed = node.key;

    *slot = match (node.left.take(), node.right.take()) {
        (None, right) => right,
        (left, None) => left,
        (left, mut right) => {
            if let Some(successor) = take_min(&mut right) {
                node.key = successor;
            }
            node.left = left;
            node.right = right;
            Some(node)
        }
    };
    Some(removed)
}

/// Detach the leftmost node under `slot` and return its key
fn take_min(mut slot: &mut Link) -> Option<usize> {
    while slot.as_ref().is_some_and(|node| node.left.is_some()) {
        slot = &mut slot.as_mut()?.left;
    }
    let Node { key, right, .. } = *slot.take()?;
    *slot = right;
    Some(key)
}

// ============================================================================
// Unit Tests
// ============================================================================
