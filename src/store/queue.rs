//! Priority queue of unshipped orders.
//!
//! ## Design
//!
//! An array-backed binary max-heap keyed on [`Prioritized::priority`].
//! For the element at index `i` the children live at `2i + 1` and `2i + 2`
//! and the parent at `(i - 1) / 2`.
//!
//! The session queues small handles pointing into its order ledger rather
//! than the orders themselves; tests and benches queue [`Order`]s directly.
//!
//! ## Ties
//!
//! Sift-up only swaps on a strictly greater priority and sift-down prefers
//! the left child when both children tie, so equal-priority orders come out
//! in an order decided by heap position, not by insertion time.

use crate::types::Order;

/// Anything the queue can rank. Higher ships first.
pub trait Prioritized {
    fn priority(&self) -> u8;
}

impl Prioritized for Order {
    #[inline]
    fn priority(&self) -> u8 {
        self.shipping_method.priority()
    }
}

/// Max-heap of orders by shipping priority.
///
/// `Clone` gives an independent snapshot that can be drained without
/// touching the live queue.
#[derive(Debug, Clone)]
pub struct OrderPriorityQueue<T = Order> {
    heap: Vec<T>,
}

impl<T> Default for OrderPriorityQueue<T> {
    fn default() -> Self {
        Self { heap: Vec::new() }
    }
}

impl<T: Prioritized> OrderPriorityQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Add an entry and restore the heap property
    pub fn insert(&mut self, entry: T) {
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the highest-priority entry
    pub fn remove(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let top = self.heap.pop();

        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Highest-priority entry without removing it
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Independent copy of the queue
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        self.clone()
    }

    /// Every queued entry, highest priority first, taken from a snapshot.
    /// The live queue is not modified.
    pub fn drain_by_priority(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut snapshot = self.copy();
        let mut ordered = Vec::with_capacity(snapshot.len());
        while let Some(entry) = snapshot.remove() {
            ordered.push(entry);
        }
        ordered
    }

    /// Entries in heap-array order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter()
    }

    /// Check the heap property: no child outranks its parent
    pub fn is_valid_heap(&self) -> bool {
        (1..self.heap.len())
            .all(|i| self.heap[(i - 1) / 2].priority() >= self.heap[i].priority())
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].priority() > self.heap[parent].priority() {
                self.heap.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut largest = idx;

            if left < len && self.heap[left].priority() > self.heap[largest].priority() {
                largest = left;
            }
            if right < len && self.heap[right].priority() > self.heap[largest].priority() {
                largest = right;
            }

            if largest == idx {
                break;
            }
            self.heap.swap(idx, largest);
            idx = largest;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
