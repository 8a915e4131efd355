//! User index: a chained hash table keyed by username.
//!
//! ## Design
//!
//! - Fixed number of buckets chosen at construction; the table never
//!   resizes, so the load factor grows with the user count.
//! - Each bucket is a singly-linked chain of boxed entries.
//! - New keys are linked in at the head of their bucket's chain; inserting
//!   an existing key replaces its user in place.
//! - Users are never deleted.
//!
//! The bucket for a username is `hash(username) % bucket_count`. The
//! default hasher is deterministic, so the same users always land in the
//! same buckets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault};

use crate::types::User;

/// Bucket count used by [`UserIndex::new`]
pub const DEFAULT_BUCKETS: usize = 20;

type Chain = Option<Box<Entry>>;

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: User,
    next: Chain,
}

/// Chained hash table mapping username to [`User`].
#[derive(Debug, Clone)]
pub struct UserIndex<S = BuildHasherDefault<DefaultHasher>> {
    buckets: Vec<Chain>,
    len: usize,
    hasher: S,
}

impl Default for UserIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl UserIndex {
    /// Create an index with [`DEFAULT_BUCKETS`] buckets
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create an index with a fixed bucket count (at least one)
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, BuildHasherDefault::default())
    }
}

impl<S: BuildHasher> UserIndex<S> {
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Self {
        let buckets = buckets.max(1);
        Self {
            buckets: std::iter::repeat_with(|| None).take(buckets).collect(),
            len: 0,
            hasher,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Average chain length
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Insert or replace the user stored under `username`.
    ///
    /// # Returns
    ///
    /// The previous user for this key, if any.
    pub fn insert(&mut self, username: impl Into<String>, user: User) -> Option<User> {
        let username = username.into();
        let index = self.bucket_index(&username);

        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.key == username {
                return Some(std::mem::replace(&mut entry.value, user));
            }
            cursor = entry.next.as_deref_mut();
        }

        let head = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry {
            key: username,
            value: user,
            next: head,
        }));
        self.len += 1;
        None
    }

    /// Look up a user by exact username
    pub fn search(&self, username: &str) -> Option<&User> {
        self.chain(self.bucket_index(username))
            .find(|entry| entry.key == username)
            .map(|entry| &entry.value)
    }

    /// Mutable lookup, for password and name edits
    pub fn search_mut(&mut self, username: &str) -> Option<&mut User> {
        let index = self.bucket_index(username);
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.key == username {
                return Some(&mut entry.value);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    #[inline]
    pub fn contains(&self, username: &str) -> bool {
        self.search(username).is_some()
    }

    /// Every stored user, in bucket order then chain order
    pub fn all_users(&self) -> Vec<&User> {
        (0..self.buckets.len())
            .flat_map(|index| self.chain(index))
            .map(|entry| &entry.value)
            .collect()
    }

    /// Length of the longest chain
    pub fn longest_chain(&self) -> usize {
        (0..self.buckets.len())
            .map(|index| self.chain(index).count())
            .max()
            .unwrap_or(0)
    }

    fn bucket_index(&self, username: &str) -> usize {
        (self.hasher.hash_one(username) % self.buckets.len() as u64) as usize
    }

    fn chain(&self, index: usize) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.buckets[index].as_deref(), |entry| entry.next.as_deref())
    }
}

impl<S> Drop for UserIndex<S> {
    // Unlink chains iteratively; a long chain would otherwise be dropped
    // recursively.
    fn drop(&mut self) {
        for bucket in &mut self.buckets {
            let mut next = bucket.take();
            while let Some(mut entry) = next {
                next = entry.next.take();
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
