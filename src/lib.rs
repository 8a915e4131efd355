//! # Instrument Store
//!
//! Catalog, accounts and order fulfilment for a musical-instrument shop,
//! backed by plain-text record files.
//!
//! ## Architecture
//!
//! - **Types**: Records (User, Product, Order) and fixed-point prices
//! - **Store**: The four indices (user hash table, dual-key product
//!   catalog, order priority queue, shipped-order log)
//! - **Persist**: Line-oriented record files
//! - **Session**: One context owning every index plus the order ledger
//!
//! ## Design Principles
//!
//! 1. **Single owner**: All state lives in one [`StoreSession`]; no globals
//! 2. **No floating point**: Prices are `u64` cents
//! 3. **Slab storage**: Products live in one slab and both catalog trees
//!    hold keys into it, so an update is visible through either index
//! 4. **Synchronous**: One operation at a time through `&mut self`

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: User, Product, Order, SaveReceipt
pub mod types;

/// Index structures over the core types
pub mod store;

/// Record file reading and writing
pub mod persist;

/// The store session: operations, load and save
pub mod session;

pub mod config;
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{RecordFiles, StoreConfig};
pub use error::{Result, StoreError};
pub use session::{LoadReport, StoreSession};
pub use store::{OrderPriorityQueue, Prioritized, ProductCatalog, ShippedOrderLog, UserIndex};
pub use types::{Capability, Order, Product, ProductUpdate, Role, SaveReceipt, ShippingMethod, User};
