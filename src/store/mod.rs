//! In-memory indices behind the store.
//!
//! ## Components
//!
//! - [`UserIndex`]: chained hash table, username → user
//! - [`ProductCatalog`]: product slab indexed by two unbalanced BSTs
//!   (by name, and by type with name as tie-break)
//! - [`OrderPriorityQueue`]: binary max-heap of unshipped orders
//! - [`ShippedOrderLog`]: slab-backed singly-linked log of shipped orders
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | User insert / search | O(1 + load factor) |
//! | Product add / search / remove | O(tree height) |
//! | Product update | O(tree height) |
//! | Queue insert / remove | O(log n) |
//! | Queue peek | O(1) |
//! | Log insert | O(1) |
//! | Log filter by user | O(n) |

pub mod catalog;
pub mod log;
pub mod queue;
pub mod tree;
pub mod users;

pub use catalog::ProductCatalog;
pub use log::{LogNode, ShippedOrderLog};
pub use queue::{OrderPriorityQueue, Prioritized};
pub use tree::ProductTree;
pub use users::UserIndex;
