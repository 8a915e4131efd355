//! User accounts.
//!
//! Every account shares the same fields; what it may do is decided by its
//! [`Role`]. A manager can do everything an employee can, expressed by
//! [`Role::can_fulfill`] accepting both rather than by a type hierarchy.

use std::fmt;

use crate::types::product::cmp_ignore_case;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Customer,
    Employee,
    Manager,
}

impl Role {
    /// All roles, in the order their files are written
    pub const ALL: [Role; 3] = [Role::Customer, Role::Employee, Role::Manager];

    /// Browse, place orders and view own orders
    #[inline]
    pub fn can_shop(self) -> bool {
        matches!(self, Role::Customer)
    }

    /// Look up orders, inspect the queue and ship orders
    #[inline]
    pub fn can_fulfill(self) -> bool {
        matches!(self, Role::Employee | Role::Manager)
    }

    /// Add, update and remove products
    #[inline]
    pub fn can_manage_catalog(self) -> bool {
        matches!(self, Role::Manager)
    }

    /// Whether this role grants `capability`
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Shop => self.can_shop(),
            Capability::Fulfill => self.can_fulfill(),
            Capability::ManageCatalog => self.can_manage_catalog(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Employee => "employee",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a user may be allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Shop,
    Fulfill,
    ManageCatalog,
}

impl Capability {
    /// Short description used in permission errors
    pub fn describe(self) -> &'static str {
        match self {
            Capability::Shop => "place orders",
            Capability::Fulfill => "handle orders",
            Capability::ManageCatalog => "manage the catalog",
        }
    }
}

/// A user account, keyed by `username`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl User {
    pub fn new(
        role: Role,
        username: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
        }
    }

    /// Password check (exact match)
    #[inline]
    pub fn authenticate(&self, password: &str) -> bool {
        self.password == password
    }

    /// Case-insensitive match on first and last name
    pub fn has_name(&self, first: &str, last: &str) -> bool {
        cmp_ignore_case(&self.first_name, first).is_eq()
            && cmp_ignore_case(&self.last_name, last).is_eq()
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_name(&mut self, first: impl Into<String>, last: impl Into<String>) {
        self.first_name = first.into();
        self.last_name = last.into();
    }
}
