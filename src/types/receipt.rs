//! Save receipt summarizing one flush of the store to disk.
//!
//! The receipt carries a SHA-256 fingerprint of the canonical store
//! snapshot, so two saves of the same state can be compared cheaply.

use sha2::{Digest, Sha256};

/// Summary of a completed save.
///
/// ## Example
///
/// ```
/// use instrument_store::types::SaveReceipt;
///
/// let receipt = SaveReceipt::new(3, 2, 5, [0u8; 32]);
/// assert_eq!(receipt.total_records(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReceipt {
    /// Users written across the three role files
    pub users_written: usize,

    /// Products written, in name order
    pub products_written: usize,

    /// Orders written, in ledger order
    pub orders_written: usize,

    /// SHA-256 of the canonical snapshot
    pub fingerprint: [u8; 32],
}

impl SaveReceipt {
    pub fn new(
        users_written: usize,
        products_written: usize,
        orders_written: usize,
        fingerprint: [u8; 32],
    ) -> Self {
        Self {
            users_written,
            products_written,
            orders_written,
            fingerprint,
        }
    }

    /// Compute SHA-256 of the given data
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Fingerprint as a hex string
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }

    pub fn total_records(&self) -> usize {
        self.users_written + self.products_written + self.orders_written
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
