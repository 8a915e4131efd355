//! Core record types for the instrument store
//!
//! ## Types
//!
//! - [`User`] / [`Role`]: Accounts and their capabilities
//! - [`Product`]: A catalog entry (primary key: name, secondary: type)
//! - [`Order`] / [`ShippingMethod`]: Orders and their shipping priority
//! - [`SaveReceipt`]: Result of flushing the store to disk
//!
//! ## Prices
//!
//! Prices are stored as `u64` cents. See [`price`].

mod order;
mod product;
mod receipt;
mod user;
pub mod price;

pub use order::{Order, ShippingMethod, ORDER_ID_BASE};
pub use product::{cmp_ignore_case, Product, ProductUpdate};
pub use receipt::SaveReceipt;
pub use user::{Capability, Role, User};
