//! Shipped-order log.
//!
//! ## Design
//!
//! A singly-linked list whose nodes live in a slab. `next` pointers are
//! slab keys, not references. New entries are linked in at the head, so a
//! walk from the head visits the most recently shipped order first.
//!
//! ```text
//! head (newest) -> order -> order -> tail (oldest)
//! ```
//!
//! Entries are never removed or edited.

use slab::Slab;

use crate::types::Order;

/// Log node stored in the slab.
#[derive(Debug, Clone)]
pub struct LogNode {
    /// The shipped order
    pub order: Order,

    /// Next (older) entry, `None` at the tail
    pub next: Option<usize>,
}

impl LogNode {
    #[inline]
    pub fn new(order: Order) -> Self {
        Self { order, next: None }
    }
}

/// Append-only, newest-first log of shipped orders.
#[derive(Debug, Clone, Default)]
pub struct ShippedOrderLog {
    nodes: Slab<LogNode>,

    /// Most recently shipped entry
    head: Option<usize>,
}

impl ShippedOrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link a shipped order in at the head
    pub fn insert(&mut self, order: Order) {
        let mut node = LogNode::new(order);
        node.next = self.head;
        let key = self.nodes.insert(node);
        self.head = Some(key);
    }

    /// Walk from newest to oldest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    /// Shipped orders placed by `username`, newest first
    pub fn orders_for_user(&self, username: &str) -> Vec<&Order> {
        self.iter().filter(|order| order.is_for(username)).collect()
    }
}

/// Iterator over the log, head to tail
pub struct Iter<'a> {
    nodes: &'a Slab<LogNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
