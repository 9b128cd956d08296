use rowkit_core::{
    impl_record, has_sequential, RecordError, RecordStore, SqliteStore, StoreError, StoreOptions,
};
use rusqlite::types::Value;

#[derive(Debug, Default, Clone, PartialEq)]
struct Order {
    id: Option<i64>,
    serial: Option<i64>,
    label: Option<String>,
}

impl_record!(Order => "orders" {
    id: Option<i64> [key],
    serial: Option<i64> [seq],
    label: Option<String>,
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Voucher {
    id: Option<i64>,
    serial: Option<i64>,
    batch: Option<i64>,
}

impl_record!(Voucher => "vouchers" {
    id: Option<i64> [key],
    serial: Option<i64> [seq],
    batch: Option<i64> [seq],
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Badged {
    id: Option<i64>,
    badge: Option<String>,
}

impl_record!(Badged => "badged" {
    id: Option<i64> [key],
    badge: Option<String> [seq],
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Orphan {
    id: Option<i64>,
    serial: Option<i64>,
}

impl_record!(Orphan => "no_such_table" {
    id: Option<i64> [key],
    serial: Option<i64> [seq],
});

fn open_store_with(options: &StoreOptions) -> SqliteStore {
    let store = SqliteStore::open(options).unwrap();
    store
        .execute(
            "CREATE TABLE orders (
                id INTEGER PRIMARY KEY,
                serial INTEGER,
                label TEXT UNIQUE
            );",
            &[],
        )
        .unwrap();
    store
}

fn order(label: &str) -> Order {
    Order {
        id: None,
        serial: None,
        label: Some(label.to_string()),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Plain {
    id: Option<i64>,
    label: Option<String>,
}

impl_record!(Plain => "plain" {
    id: Option<i64> [key],
    label: Option<String>,
});

#[test]
fn sequential_metadata_is_detected() {
    assert!(has_sequential::<Order>());
    assert!(has_sequential::<Voucher>());
    assert!(!has_sequential::<Plain>());
}

#[test]
fn single_threaded_inserts_are_monotonic() {
    let store = open_store_with(&StoreOptions::default());

    for n in 1..=5 {
        let mut item = order(&format!("L{n}"));
        store.insert(&mut item).unwrap();
        assert_eq!(item.serial, Some(n));
    }

    let all: Vec<Order> = store.select_all().unwrap();
    let serials: Vec<Option<i64>> = all.iter().map(|item| item.serial).collect();
    assert_eq!(
        serials,
        vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
    );
}

#[test]
fn step_is_configurable() {
    let options = StoreOptions {
        sequence_step: 5,
        ..StoreOptions::default()
    };
    let store = open_store_with(&options);

    for n in 1..=3 {
        let mut item = order(&format!("L{n}"));
        store.insert(&mut item).unwrap();
        assert_eq!(item.serial, Some(n * 5));
    }
}

#[test]
fn eager_write_lock_variant_assigns_the_same_values() {
    let options = StoreOptions {
        eager_write_lock: true,
        ..StoreOptions::default()
    };
    let store = open_store_with(&options);

    let mut first = order("L1");
    let mut second = order("L2");
    store.insert(&mut first).unwrap();
    store.insert(&mut second).unwrap();
    assert_eq!(first.serial, Some(1));
    assert_eq!(second.serial, Some(2));
}

#[test]
fn multiple_sequential_fields_are_assigned_in_declaration_order() {
    let store = SqliteStore::open(&StoreOptions::default()).unwrap();
    store
        .execute(
            "CREATE TABLE vouchers (
                id INTEGER PRIMARY KEY,
                serial INTEGER,
                batch INTEGER
            );",
            &[],
        )
        .unwrap();

    let mut voucher = Voucher::default();
    store.insert(&mut voucher).unwrap();
    assert_eq!(voucher.serial, Some(1));
    assert_eq!(voucher.batch, Some(1));

    let mut voucher = Voucher::default();
    store.insert(&mut voucher).unwrap();
    assert_eq!(voucher.serial, Some(2));
    assert_eq!(voucher.batch, Some(2));
}

#[test]
fn non_integer_sequential_field_is_rejected() {
    let store = SqliteStore::open(&StoreOptions::default()).unwrap();
    store
        .execute(
            "CREATE TABLE badged (id INTEGER PRIMARY KEY, badge TEXT);",
            &[],
        )
        .unwrap();

    let mut item = Badged::default();
    let err = store.insert(&mut item).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::SequentialKind { field: "badge", .. })
    ));

    let count = store
        .query_scalar("SELECT COUNT(*) FROM badged;", &[])
        .unwrap();
    assert_eq!(count, Some(Value::Integer(0)));
}

#[test]
fn missing_table_surfaces_sequence_error() {
    let store = SqliteStore::open(&StoreOptions::default()).unwrap();

    let mut item = Orphan::default();
    let err = store.insert(&mut item).unwrap_err();
    assert!(matches!(err, StoreError::Sequence { .. }));
}

#[test]
fn failed_insert_does_not_consume_a_value() {
    let store = open_store_with(&StoreOptions::default());

    let mut first = order("dup");
    store.insert(&mut first).unwrap();
    assert_eq!(first.serial, Some(1));

    let mut clash = order("dup");
    let err = store.insert(&mut clash).unwrap_err();
    assert!(matches!(err, StoreError::Persistence { .. }));

    let mut next = order("fresh");
    store.insert(&mut next).unwrap();
    assert_eq!(next.serial, Some(2));
}
