//! Store session: the single owner of every index.
//!
//! ## Lifecycle
//!
//! 1. [`StoreSession::open`] validates the config and loads the record files
//! 2. operations run one at a time through `&mut self`
//! 3. [`StoreSession::save`] writes everything back
//!
//! ## Order lifecycle
//!
//! A placed or loaded order is appended to the ledger (the master list of
//! every order, in creation order) and its ledger position is inserted into
//! the priority queue. Shipping pops a position, sets the `shipped` flag on
//! exactly that ledger entry and copies it into the shipped log. Order IDs
//! read from disk may repeat, so nothing on this path looks orders up by
//! ID. An order is never in the queue and the log at the same time.
//!
//! ## Example
//!
//! ```
//! use instrument_store::session::StoreSession;
//! use instrument_store::types::{Product, ShippingMethod};
//! use instrument_store::StoreConfig;
//!
//! let mut session = StoreSession::new(StoreConfig::default());
//! session.create_customer("alice", "pw", "Alice", "Smith").unwrap();
//! session
//!     .add_product(Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Student tuba"))
//!     .unwrap();
//!
//! let id = session.place_order("alice", "tuba", ShippingMethod::Rush).unwrap();
//! assert_eq!(id, 1001);
//!
//! let shipped = session.ship_next_order().unwrap();
//! assert_eq!(shipped.id, id);
//! assert_eq!(session.shipped_orders_for("alice").len(), 1);
//! ```

mod storage;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::{OrderPriorityQueue, Prioritized, ProductCatalog, ShippedOrderLog, UserIndex};
use crate::types::{
    Capability, Order, Product, ProductUpdate, Role, ShippingMethod, User, ORDER_ID_BASE,
};

pub use storage::LoadReport;

/// Queue entry for an unshipped order: where it sits in the ledger and the
/// priority it was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOrder {
    pub position: usize,
    pub priority: u8,
}

impl Prioritized for PendingOrder {
    #[inline]
    fn priority(&self) -> u8 {
        self.priority
    }
}

/// Every index of the store plus the order ledger.
#[derive(Debug)]
pub struct StoreSession {
    config: StoreConfig,

    users: UserIndex,

    catalog: ProductCatalog,

    /// Ledger positions of unshipped orders, by shipping priority
    queue: OrderPriorityQueue<PendingOrder>,

    /// Shipped orders, newest first
    shipped: ShippedOrderLog,

    /// Every order ever created, in creation order
    ledger: Vec<Order>,

    /// Order ID to ledger position (first occurrence)
    order_index: HashMap<u32, usize>,
}

impl StoreSession {
    /// Create an empty session; nothing is read from disk
    pub fn new(config: StoreConfig) -> Self {
        Self {
            users: UserIndex::with_buckets(config.user_buckets),
            catalog: ProductCatalog::new(),
            queue: OrderPriorityQueue::new(),
            shipped: ShippedOrderLog::new(),
            ledger: Vec::new(),
            order_index: HashMap::new(),
            config,
        }
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[inline]
    pub fn users(&self) -> &UserIndex {
        &self.users
    }

    #[inline]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    #[inline]
    pub fn queue(&self) -> &OrderPriorityQueue<PendingOrder> {
        &self.queue
    }

    #[inline]
    pub fn shipped_log(&self) -> &ShippedOrderLog {
        &self.shipped
    }

    /// Every order in creation order
    #[inline]
    pub fn ledger(&self) -> &[Order] {
        &self.ledger
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// `UserExists` if the username is taken by any role.
    pub fn create_customer(
        &mut self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<&User> {
        if self.users.contains(username) {
            return Err(StoreError::UserExists(username.to_string()));
        }

        let user = User::new(Role::Customer, username, password, first_name, last_name);
        self.users.insert(username, user);
        info!(username, "customer account created");

        self.users
            .search(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    /// Insert or replace an account of any role
    pub fn upsert_user(&mut self, user: User) -> Option<User> {
        self.users.insert(user.username.clone(), user)
    }

    /// Log in as exactly `role`.
    ///
    /// A manager logging in as an employee is refused; managers reach
    /// employee operations through [`StoreSession::authorize`].
    pub fn login(&self, username: &str, password: &str, role: Role) -> Result<&User> {
        match self.users.search(username) {
            Some(user) if user.role == role && user.authenticate(password) => Ok(user),
            _ => Err(StoreError::AuthenticationFailed(username.to_string())),
        }
    }

    /// Check credentials and that the user's role grants `capability`.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` for an unknown user or wrong password
    /// - `PermissionDenied` if the role lacks the capability
    pub fn authorize(
        &self,
        username: &str,
        password: &str,
        capability: Capability,
    ) -> Result<&User> {
        let user = self
            .users
            .search(username)
            .filter(|user| user.authenticate(password))
            .ok_or_else(|| StoreError::AuthenticationFailed(username.to_string()))?;

        if !user.role.allows(capability) {
            return Err(StoreError::PermissionDenied {
                username: username.to_string(),
                action: capability.describe(),
            });
        }
        Ok(user)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub fn add_product(&mut self, product: Product) -> Result<()> {
        self.catalog.add_product(product)
    }

    pub fn update_product(&mut self, name: &str, update: ProductUpdate) -> Result<&Product> {
        self.catalog.update_product(name, update)
    }

    pub fn remove_product(&mut self, name: &str) -> Result<Product> {
        self.catalog.remove_product(name)
    }

    pub fn search_product_by_name(&self, name: &str) -> Option<&Product> {
        self.catalog.search_by_name(name)
    }

    /// One product of this type; see [`ProductCatalog::search_by_type`]
    pub fn search_product_by_type(&self, kind: &str) -> Option<&Product> {
        self.catalog.search_by_type(kind)
    }

    pub fn products_by_name(&self) -> Vec<&Product> {
        self.catalog.products_by_name()
    }

    pub fn products_by_type(&self) -> Vec<&Product> {
        self.catalog.products_by_type()
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// ID the next placed order will receive
    pub fn next_order_id(&self) -> u32 {
        ORDER_ID_BASE + self.ledger.len() as u32 + 1
    }

    /// Place an order for an existing product.
    ///
    /// The product name is stored as typed; later catalog changes do not
    /// affect the order.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if `username` has no account
    /// - `ProductNotFound` if no product has this name
    pub fn place_order(
        &mut self,
        username: &str,
        product_name: &str,
        method: ShippingMethod,
    ) -> Result<u32> {
        if !self.users.contains(username) {
            return Err(StoreError::UserNotFound(username.to_string()));
        }
        if !self.catalog.contains(product_name) {
            return Err(StoreError::ProductNotFound(product_name.to_string()));
        }

        let id = self.next_order_id();
        self.enqueue(Order::new(id, username, product_name, method));
        info!(id, username, product = product_name, %method, "order placed");
        Ok(id)
    }

    /// Ship the highest-priority unshipped order.
    ///
    /// # Errors
    ///
    /// `QueueEmpty` if there is nothing to ship.
    pub fn ship_next_order(&mut self) -> Result<Order> {
        let pending = self.queue.remove().ok_or(StoreError::QueueEmpty)?;
        let entry = &mut self.ledger[pending.position];
        entry.shipped = true;

        let order = entry.clone();
        self.shipped.insert(order.clone());
        info!(id = order.id, username = %order.username, "order shipped");
        Ok(order)
    }

    /// Highest-priority unshipped order
    pub fn highest_priority_order(&self) -> Option<&Order> {
        self.queue.peek().map(|pending| &self.ledger[pending.position])
    }

    /// All unshipped orders, highest priority first. The queue is untouched.
    pub fn orders_by_priority(&self) -> Vec<Order> {
        self.queue
            .drain_by_priority()
            .into_iter()
            .map(|pending| self.ledger[pending.position].clone())
            .collect()
    }

    /// Shipped orders for a user, most recently shipped first
    pub fn shipped_orders_for(&self, username: &str) -> Vec<&Order> {
        self.shipped.orders_for_user(username)
    }

    /// Unshipped orders for a user, in creation order
    pub fn unshipped_orders_for(&self, username: &str) -> Vec<&Order> {
        self.ledger
            .iter()
            .filter(|order| order.is_for(username) && !order.shipped)
            .collect()
    }

    /// Look up an order by ID
    pub fn find_order(&self, id: u32) -> Option<&Order> {
        self.order_index.get(&id).map(|&pos| &self.ledger[pos])
    }

    /// Orders placed by customers with this first and last name (ignoring
    /// case), in creation order
    pub fn orders_for_customer_name(&self, first_name: &str, last_name: &str) -> Vec<&Order> {
        self.ledger
            .iter()
            .filter(|order| {
                self.users.search(&order.username).is_some_and(|user| {
                    user.role == Role::Customer && user.has_name(first_name, last_name)
                })
            })
            .collect()
    }

    /// Append to the ledger and queue an unshipped order
    fn enqueue(&mut self, mut order: Order) {
        order.shipped = false;
        let position = self.ledger.len();
        let priority = order.priority();
        self.order_index.entry(order.id).or_insert(position);
        self.ledger.push(order);
        self.queue.insert(PendingOrder { position, priority });
        debug!(pending = self.queue.len(), "order queued");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
