//! Error type shared by the store, the session and persistence.
//!
//! Lookups that can simply miss return `Option`; the variants here cover
//! operations that cannot proceed (duplicate keys, failed logins, empty
//! queue) and load/save failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the instrument store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Account creation with a username that is already taken
    #[error("username '{0}' already exists")]
    UserExists(String),

    /// Username is not present in the user index
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// Unknown user, wrong role or wrong password
    #[error("invalid credentials or role for '{0}'")]
    AuthenticationFailed(String),

    /// The user's role does not grant the requested capability
    #[error("user '{username}' is not allowed to {action}")]
    PermissionDenied { username: String, action: &'static str },

    /// A product with this name (case-insensitive) already exists
    #[error("a product named '{0}' already exists")]
    ProductExists(String),

    #[error("product '{0}' not found")]
    ProductNotFound(String),

    /// Adding stock would overflow the quantity counter
    #[error("stock for '{name}' cannot grow by {requested}")]
    StockOverflow { name: String, requested: u32 },

    #[error("order {0} not found")]
    OrderNotFound(u32),

    /// Nothing left in the priority queue to ship
    #[error("no unshipped orders")]
    QueueEmpty,

    #[error("invalid price '{0}'")]
    InvalidPrice(String),

    #[error("invalid shipping method '{0}'")]
    InvalidShippingMethod(String),

    /// A well-formed record line carried a field that failed to parse.
    ///
    /// Aborts the rest of that file's load.
    #[error("{file}:{line}: malformed {field} '{value}'")]
    MalformedField {
        file: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a record reader/writer error with the path it happened on
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a missing-entity or rejected-request error that
    /// leaves the store untouched, as opposed to a load/save failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StoreError::MalformedField { .. }
                | StoreError::Io { .. }
                | StoreError::Csv { .. }
                | StoreError::InvalidConfig { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::ProductExists("Tuba".into());
        assert_eq!(err.to_string(), "a product named 'Tuba' already exists");

        let err = StoreError::MalformedField {
            file: PathBuf::from("products.txt"),
            line: 3,
            field: "price",
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "products.txt:3: malformed price 'abc'");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(StoreError::QueueEmpty.is_recoverable());
        assert!(StoreError::ProductNotFound("x".into()).is_recoverable());

        let io = StoreError::io(
            "orders.txt",
            std::io::Error::new(std::io::ErrorKind::Other, "disk"),
        );
        assert!(!io.is_recoverable());
    }
}
