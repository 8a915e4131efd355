//! Loading, saving and fingerprinting a session.
//!
//! ## Load order
//!
//! Users (customers, employees, managers), then products, then orders. A
//! product whose name repeats an earlier line is logged and skipped, so the
//! first line wins. Products are then added median-first by name, which
//! keeps both catalog trees shallow even though the file is written in name
//! order. Orders keep the ID stored in the file and always start unshipped.
//!
//! ## Fingerprint
//!
//! SHA-256 over a canonical byte stream: users sorted by username, products
//! in name order, orders in ledger order. Fields are separated by `0x1f` and
//! records by `0x1e`, so no field text can fake a boundary. The shipped
//! flag is not part of the stream because it is not persisted either.

use std::cmp::Ordering;

use tracing::{info, warn};

use super::StoreSession;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::persist::records::{
    decode_order, decode_product, decode_user, encode_order, encode_product, encode_user,
    ORDER_FIELDS, ORDER_HEADER, PRODUCT_FIELDS, PRODUCT_HEADER, USER_FIELDS, USER_HEADER,
};
use crate::persist::{read_records, write_records};
use crate::types::{cmp_ignore_case, Product, Role, SaveReceipt};

const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// Counts from one [`StoreSession::load`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub users: usize,
    pub products: usize,
    pub orders: usize,
    /// Lines skipped for bad arity or a duplicate product name
    pub skipped: usize,
}

impl StoreSession {
    /// Validate `config`, then load every record file it names.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` or any load error; see [`StoreSession::load`].
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(config);
        session.load()?;
        Ok(session)
    }

    /// Read every record file into this session.
    ///
    /// Records are added on top of whatever the session already holds.
    ///
    /// # Errors
    ///
    /// `MalformedField` if a numeric field or shipping method fails to
    /// parse; records before it in that file stay loaded. `Io` or `Csv` if a
    /// file exists but cannot be read.
    pub fn load(&mut self) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for role in Role::ALL {
            let path = self.config.users_path(role);
            let users = &mut self.users;
            let stats = read_records::<USER_FIELDS, _>(&path, |fields, _| {
                let user = decode_user(role, fields);
                users.insert(user.username.clone(), user);
                Ok(())
            })?;
            report.users += stats.accepted;
            report.skipped += stats.skipped;
        }

        let path = self.config.products_path();
        let mut products = Vec::new();
        let stats = read_records::<PRODUCT_FIELDS, _>(&path, |fields, at| {
            products.push((decode_product(fields, at)?, at.line));
            Ok(())
        });

        // Stable sort: among equal names the earliest line stays first
        products.sort_by(|(a, _), (b, _)| cmp_ignore_case(&a.name, &b.name));
        let mut unique: Vec<Product> = Vec::with_capacity(products.len());
        let mut duplicates = 0;
        for (product, line) in products {
            match unique.last() {
                Some(kept) if kept.cmp_name(&product.name) == Ordering::Equal => {
                    warn!(file = %path.display(), line, product = %product.name, "duplicate product skipped");
                    duplicates += 1;
                }
                _ => unique.push(product),
            }
        }
        let accepted = self.catalog.extend_balanced(unique)?;
        let stats = stats?;
        report.products += accepted;
        report.skipped += stats.skipped + duplicates;

        let path = self.config.orders_path();
        let mut orders = Vec::new();
        let stats = read_records::<ORDER_FIELDS, _>(&path, |fields, at| {
            orders.push(decode_order(fields, at)?);
            Ok(())
        });
        // Orders decoded before a malformed line are kept
        for order in orders {
            self.enqueue(order);
        }
        let stats = stats?;
        report.orders += stats.accepted;
        report.skipped += stats.skipped;

        info!(
            data_dir = %self.config.data_dir.display(),
            users = report.users,
            products = report.products,
            orders = report.orders,
            skipped = report.skipped,
            "store loaded"
        );
        Ok(report)
    }

    /// Write every record file, replacing what is on disk.
    ///
    /// Users go to the file for their role, products in name order, orders
    /// in ledger order.
    pub fn save(&self) -> Result<SaveReceipt> {
        let all_users = self.users.all_users();

        let mut users_written = 0;
        for role in Role::ALL {
            let rows = all_users
                .iter()
                .filter(|user| user.role == role)
                .map(|user| encode_user(user));
            users_written += write_records(&self.config.users_path(role), USER_HEADER, rows)?;
        }

        let products_written = write_records(
            &self.config.products_path(),
            PRODUCT_HEADER,
            self.catalog.products_by_name().into_iter().map(encode_product),
        )?;

        let orders_written = write_records(
            &self.config.orders_path(),
            ORDER_HEADER,
            self.ledger.iter().map(encode_order),
        )?;

        let receipt = SaveReceipt::new(
            users_written,
            products_written,
            orders_written,
            self.fingerprint(),
        );
        info!(
            records = receipt.total_records(),
            fingerprint = %receipt.fingerprint_hex(),
            "store saved"
        );
        Ok(receipt)
    }

    /// SHA-256 of the persisted state
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut bytes = Vec::new();

        let mut users = self.users.all_users();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        for user in users {
            push_record(&mut bytes, user.role.as_str(), &encode_user(user));
        }

        for product in self.catalog.products_by_name() {
            push_record(&mut bytes, "product", &encode_product(product));
        }

        for order in &self.ledger {
            push_record(&mut bytes, "order", &encode_order(order));
        }

        SaveReceipt::compute_hash(&bytes)
    }

    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint())
    }
}

fn push_record<T: AsRef<str>>(bytes: &mut Vec<u8>, tag: &str, fields: &[T]) {
    bytes.extend_from_slice(tag.as_bytes());
    for field in fields {
        bytes.push(FIELD_SEP);
        bytes.extend_from_slice(field.as_ref().as_bytes());
    }
    bytes.push(RECORD_SEP);
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::StoreError;
    use crate::types::{ShippingMethod, User};

    fn config(dir: &std::path::Path) -> StoreConfig {
        StoreConfig::new().data_dir(dir)
    }

    #[test]
    fn test_open_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let session = StoreSession::open(config(dir.path())).unwrap();

        assert!(session.users().is_empty());
        assert!(session.catalog().is_empty());
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreSession::open(config(dir.path()).user_buckets(0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_assigns_roles_by_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("customers.txt"), "alice,pw,Alice,Smith\n").unwrap();
        fs::write(dir.path().join("employees.txt"), "ed,pw,Ed,Stone\n").unwrap();
        fs::write(dir.path().join("managers.txt"), "mia,pw,Mia,Park\n").unwrap();

        let session = StoreSession::open(config(dir.path())).unwrap();

        assert_eq!(session.users().search("alice").unwrap().role, Role::Customer);
        assert_eq!(session.users().search("ed").unwrap().role, Role::Employee);
        assert_eq!(session.users().search("mia").unwrap().role, Role::Manager);
    }

    #[test]
    fn test_load_skips_duplicate_product() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("products.txt"),
            "Tuba,Brass,1200.00,Yamaha,3,First\n\
             TUBA,Brass,999.00,Jupiter,1,Second\n",
        )
        .unwrap();

        let mut session = StoreSession::new(config(dir.path()));
        let report = session.load().unwrap();

        assert_eq!(report.products, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(session.search_product_by_name("tuba").unwrap().brand, "Yamaha");
        assert!(session.catalog().is_consistent());
    }

    #[test]
    fn test_reload_of_sorted_file_builds_shallow_trees() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = StoreSession::new(config(dir.path()));
        for i in 0..2_000 {
            session
                .add_product(Product::new(format!("Item{i:05}"), "Brass", 100, "Acme", 1, "d"))
                .unwrap();
        }
        session.save().unwrap();

        let reloaded = StoreSession::open(config(dir.path())).unwrap();
        let (name_height, type_height) = reloaded.catalog().heights();
        assert!(name_height <= 11, "name tree height {name_height}");
        assert!(type_height <= 11, "type tree height {type_height}");
        assert_eq!(reloaded.products_by_name().len(), 2_000);
        assert_eq!(reloaded.fingerprint(), session.fingerprint());
    }

    #[test]
    fn test_loaded_orders_are_queued() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("orders.txt"),
            "1001,alice,Tuba,STANDARD\n1002,bob,Flute,OVERNIGHT\n",
        )
        .unwrap();

        let session = StoreSession::open(config(dir.path())).unwrap();

        assert_eq!(session.queue().len(), 2);
        assert_eq!(session.highest_priority_order().unwrap().id, 1002);
        assert_eq!(session.next_order_id(), 1003);
    }

    #[test]
    fn test_malformed_order_keeps_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("orders.txt"),
            "1001,alice,Tuba,RUSH\nabc,bob,Flute,RUSH\n1003,bob,Flute,RUSH\n",
        )
        .unwrap();

        let mut session = StoreSession::new(config(dir.path()));
        let err = session.load().unwrap_err();

        assert!(matches!(err, StoreError::MalformedField { line: 2, field: "orderID", .. }));
        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.queue().len(), 1);
    }

    #[test]
    fn test_fingerprint_tracks_persisted_state() {
        let mut session = StoreSession::new(StoreConfig::default());
        session.create_customer("alice", "pw", "Alice", "Smith").unwrap();
        session
            .add_product(Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Tuba"))
            .unwrap();
        let before = session.fingerprint();

        session.place_order("alice", "Tuba", ShippingMethod::Rush).unwrap();
        let placed = session.fingerprint();
        assert_ne!(before, placed);

        // Shipping is not persisted
        session.ship_next_order().unwrap();
        assert_eq!(session.fingerprint(), placed);
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut a = StoreSession::new(StoreConfig::default());
        let mut b = StoreSession::new(StoreConfig::default());

        for name in ["zoe", "adam", "mike"] {
            a.upsert_user(User::new(Role::Customer, name, "pw", name, name));
        }
        for name in ["mike", "zoe", "adam"] {
            b.upsert_user(User::new(Role::Customer, name, "pw", name, name));
        }

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint_hex().len(), 64);
    }

    #[test]
    fn test_save_writes_one_file_per_record_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = StoreSession::new(config(dir.path()));
        session.create_customer("alice", "pw", "Alice", "Smith").unwrap();
        session.upsert_user(User::new(Role::Manager, "mia", "pw", "Mia", "Park"));
        session
            .add_product(Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Tuba"))
            .unwrap();
        session.place_order("alice", "Tuba", ShippingMethod::Rush).unwrap();

        let receipt = session.save().unwrap();

        assert_eq!(receipt.users_written, 2);
        assert_eq!(receipt.products_written, 1);
        assert_eq!(receipt.orders_written, 1);
        assert_eq!(receipt.fingerprint, session.fingerprint());

        let employees = fs::read_to_string(dir.path().join("employees.txt")).unwrap();
        assert_eq!(employees, format!("{USER_HEADER}\n"));

        let orders = fs::read_to_string(dir.path().join("orders.txt")).unwrap();
        assert!(orders.ends_with("1001,alice,Tuba,RUSH\n"));
    }
}
