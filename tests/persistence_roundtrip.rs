//! Save/reload round trips through real record files.

use std::fs;
use std::path::Path;

use instrument_store::persist::records::PRODUCT_HEADER;
use instrument_store::{
    Product, ProductUpdate, Role, ShippingMethod, StoreConfig, StoreError, StoreSession, User,
};

fn open(dir: &Path) -> StoreSession {
    StoreSession::open(StoreConfig::new().data_dir(dir)).unwrap()
}

fn seeded(dir: &Path) -> StoreSession {
    let mut session = open(dir);
    session.create_customer("alice", "pw", "Alice", "Smith").unwrap();
    session.upsert_user(User::new(Role::Employee, "ed", "pw", "Ed", "Stone"));
    session.upsert_user(User::new(Role::Manager, "mia", "pw", "Mia", "Park"));
    session
        .add_product(Product::new("Tuba", "Brass", 120_000, "Yamaha", 3, "Student tuba"))
        .unwrap();
    session
        .add_product(Product::new("Flute", "Woodwind", 30_000, "Gemeinhardt", 5, "Beginner, closed hole"))
        .unwrap();
    session
        .add_product(Product::new("Trumpet", "Brass", 45_050, "Bach", 2, "Bb trumpet"))
        .unwrap();
    session
}

#[test]
fn test_products_round_trip_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let saved = seeded(dir.path());
    saved.save().unwrap();

    let text = fs::read_to_string(dir.path().join("products.txt")).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(PRODUCT_HEADER));
    assert_eq!(lines.next(), Some("Flute,Woodwind,300.00,Gemeinhardt,5,\"Beginner, closed hole\""));
    assert_eq!(lines.next(), Some("Trumpet,Brass,450.50,Bach,2,Bb trumpet"));
    assert_eq!(lines.next(), Some("Tuba,Brass,1200.00,Yamaha,3,Student tuba"));
    assert_eq!(lines.next(), None);

    let reloaded = open(dir.path());
    let before: Vec<&Product> = saved.products_by_name();
    let after: Vec<&Product> = reloaded.products_by_name();
    assert_eq!(before, after);
    assert_eq!(reloaded.fingerprint(), saved.fingerprint());
}

#[test]
fn test_type_index_rebuilt_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path()).save().unwrap();

    let mut reloaded = open(dir.path());
    let kinds: Vec<(&str, &str)> = reloaded
        .products_by_type()
        .iter()
        .map(|p| (p.kind.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        kinds,
        vec![("Brass", "Trumpet"), ("Brass", "Tuba"), ("Woodwind", "Flute")]
    );

    let brass = reloaded.search_product_by_type("brass").unwrap();
    assert!(brass.name == "Tuba" || brass.name == "Trumpet");

    reloaded.remove_product("tuba").unwrap();
    assert!(reloaded.search_product_by_name("Tuba").is_none());
    assert_eq!(reloaded.search_product_by_type("Brass").unwrap().name, "Trumpet");
    assert!(reloaded.catalog().is_consistent());
}

#[test]
fn test_updates_persist() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = seeded(dir.path());
    session.update_product("FLUTE", ProductUpdate::Price(27_500)).unwrap();
    session.update_product("Flute", ProductUpdate::AddStock(10)).unwrap();
    session
        .update_product("Flute", ProductUpdate::Description("Open hole".into()))
        .unwrap();
    session.save().unwrap();

    let reloaded = open(dir.path());
    let flute = reloaded.search_product_by_name("flute").unwrap();
    assert_eq!(flute.price, 27_500);
    assert_eq!(flute.quantity, 15);
    assert_eq!(flute.description, "Open hole");
}

#[test]
fn test_users_keep_roles_across_reload() {
    let dir = tempfile::tempdir().unwrap();
    seeded(dir.path()).save().unwrap();

    let reloaded = open(dir.path());
    assert!(reloaded.login("alice", "pw", Role::Customer).is_ok());
    assert!(reloaded.login("ed", "pw", Role::Employee).is_ok());
    assert!(reloaded.login("mia", "pw", Role::Manager).is_ok());
    assert_eq!(reloaded.users().len(), 3);
}

#[test]
fn test_shipped_state_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = seeded(dir.path());
    let a = session.place_order("alice", "Tuba", ShippingMethod::Standard).unwrap();
    let b = session.place_order("alice", "Flute", ShippingMethod::Overnight).unwrap();
    session.ship_next_order().unwrap();
    assert_eq!(session.unshipped_orders_for("alice").len(), 1);
    session.save().unwrap();

    let orders = fs::read_to_string(dir.path().join("orders.txt")).unwrap();
    assert!(orders.contains(&format!("{a},alice,Tuba,STANDARD\n")));
    assert!(orders.contains(&format!("{b},alice,Flute,OVERNIGHT\n")));

    let mut reloaded = open(dir.path());
    assert_eq!(reloaded.unshipped_orders_for("alice").len(), 2);
    assert!(reloaded.shipped_orders_for("alice").is_empty());
    assert_eq!(reloaded.queue().len(), 2);
    assert_eq!(reloaded.ship_next_order().unwrap().id, b);
}

#[test]
fn test_order_ids_continue_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = seeded(dir.path());
    session.place_order("alice", "Tuba", ShippingMethod::Rush).unwrap();
    session.place_order("alice", "Tuba", ShippingMethod::Rush).unwrap();
    session.save().unwrap();

    let mut reloaded = open(dir.path());
    assert_eq!(reloaded.place_order("alice", "Flute", ShippingMethod::Rush).unwrap(), 1003);
}

#[test]
fn test_malformed_price_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("products.txt"),
        "# Format: instrumentName, instrumentType, price, brand, quantityInStock, description\n\
         Tuba,Brass,1200.00,Yamaha,3,Student tuba\n\
         Flute,Woodwind,three hundred,Gemeinhardt,5,Beginner flute\n",
    )
    .unwrap();

    let err = StoreSession::open(StoreConfig::new().data_dir(dir.path())).unwrap_err();
    assert!(!err.is_recoverable());
    match err {
        StoreError::MalformedField { line, field, value, .. } => {
            assert_eq!(line, 3);
            assert_eq!(field, "price");
            assert_eq!(value, "three hundred");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_legacy_file_layout_loads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("customers.txt"),
        "# Format: username,password,firstName,lastName\n\
         jdoe,secret,John,Doe\n\
         \n\
         broken,line\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("products.txt"),
        "# Format: instrumentName, instrumentType, price, brand, quantityInStock, description\n\
         Violin,String,899.99,Stentor,4,Full size\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("orders.txt"),
        "# Format: orderID,username,productName,shippingMethod\n\
         1001,jdoe,Violin,rush\n",
    )
    .unwrap();

    let mut session = StoreSession::new(StoreConfig::new().data_dir(dir.path()));
    let report = session.load().unwrap();

    assert_eq!(report.users, 1);
    assert_eq!(report.products, 1);
    assert_eq!(report.orders, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(session.search_product_by_name("violin").unwrap().price, 89_999);
    assert_eq!(session.orders_for_customer_name("john", "DOE")[0].id, 1001);
}

#[test]
fn test_shipping_after_reload_with_gapped_order_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = seeded(dir.path());
    session.create_customer("bob", "pw", "Bob", "Jones").unwrap();
    session.save().unwrap();
    fs::write(
        dir.path().join("orders.txt"),
        "# Format: orderID,username,productName,shippingMethod\n\
         1002,bob,Tuba,STANDARD\n\
         1003,bob,Flute,STANDARD\n",
    )
    .unwrap();

    let mut reloaded = open(dir.path());
    let id = reloaded.place_order("alice", "Trumpet", ShippingMethod::Overnight).unwrap();
    assert_eq!(id, 1003);

    let shipped = reloaded.ship_next_order().unwrap();
    assert_eq!((shipped.username.as_str(), shipped.product_name.as_str()), ("alice", "Trumpet"));

    let alice: Vec<u32> = reloaded.shipped_orders_for("alice").iter().map(|o| o.id).collect();
    assert_eq!(alice, vec![1003]);
    assert!(reloaded.unshipped_orders_for("alice").is_empty());
    assert_eq!(reloaded.unshipped_orders_for("bob").len(), 2);
    assert_eq!(
        reloaded.queue().len() + reloaded.shipped_log().len(),
        reloaded.ledger().len()
    );
}
