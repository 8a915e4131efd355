//! Store configuration
//!
//! Where the record files live and how the user index is sized, with
//! builder-style setters and validation.

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::store::users::DEFAULT_BUCKETS;
use crate::types::Role;

/// File names for each record type, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFiles {
    pub customers: String,
    pub employees: String,
    pub managers: String,
    pub products: String,
    pub orders: String,
}

impl Default for RecordFiles {
    fn default() -> Self {
        Self {
            customers: "customers.txt".into(),
            employees: "employees.txt".into(),
            managers: "managers.txt".into(),
            products: "products.txt".into(),
            orders: "orders.txt".into(),
        }
    }
}

impl RecordFiles {
    fn all(&self) -> [(&'static str, &str); 5] {
        [
            ("files.customers", self.customers.as_str()),
            ("files.employees", self.employees.as_str()),
            ("files.managers", self.managers.as_str()),
            ("files.products", self.products.as_str()),
            ("files.orders", self.orders.as_str()),
        ]
    }
}

/// Configuration for a store session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the record files
    pub data_dir: PathBuf,
    /// Fixed bucket count for the user index
    pub user_buckets: usize,
    pub files: RecordFiles,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            user_buckets: DEFAULT_BUCKETS,
            files: RecordFiles::default(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the user index bucket count
    pub fn user_buckets(mut self, buckets: usize) -> Self {
        self.user_buckets = buckets;
        self
    }

    /// Replace the record file names
    pub fn files(mut self, files: RecordFiles) -> Self {
        self.files = files;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.user_buckets == 0 {
            return Err(StoreError::InvalidConfig {
                field: "user_buckets",
                reason: "must be greater than 0".into(),
            });
        }

        let files = self.files.all();
        for (i, (field, name)) in files.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(StoreError::InvalidConfig {
                    field: *field,
                    reason: "file name must not be empty".into(),
                });
            }
            if files[..i].iter().any(|(_, other)| other == name) {
                return Err(StoreError::InvalidConfig {
                    field: *field,
                    reason: format!("'{name}' is already used by another record type"),
                });
            }
        }

        Ok(())
    }

    /// Path of the user file for a role
    pub fn users_path(&self, role: Role) -> PathBuf {
        let name = match role {
            Role::Customer => &self.files.customers,
            Role::Employee => &self.files.employees,
            Role::Manager => &self.files.managers,
        };
        self.data_dir.join(name)
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.products)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.orders)
    }
}
