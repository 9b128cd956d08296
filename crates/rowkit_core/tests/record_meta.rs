use rowkit_core::{
    field_of, impl_record, merge_non_null, read_field, where_clause, write_field, FieldKind,
    Record, RecordError,
};
use rusqlite::types::Value;
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq)]
struct Product {
    id: Option<i64>,
    code: Option<String>,
    qty: Option<i64>,
    price: Option<f64>,
    active: bool,
}

impl_record!(Product => "products" {
    id: Option<i64> [key],
    code: Option<String>,
    qty: Option<i64>,
    price: Option<f64>,
    active: bool,
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Sparse {
    id: Option<i64>,
    note: Option<String>,
}

impl_record!(Sparse => "sparse" {
    id: Option<i64> [key],
    note: Option<String>,
});

#[derive(Debug, Default, Clone, PartialEq)]
struct Tag {
    id: Option<i64>,
    ref_id: Option<Uuid>,
}

impl_record!(Tag => "tags" {
    id: Option<i64> [key],
    ref_id: Option<Uuid>,
});

#[test]
fn metadata_reflects_declaration_order_and_flags() {
    let names: Vec<&str> = Product::fields().iter().map(|def| def.name).collect();
    assert_eq!(names, vec!["id", "code", "qty", "price", "active"]);

    let id = &Product::fields()[0];
    assert!(id.primary_key);
    assert!(!id.sequential);
    assert!(id.nullable);
    assert_eq!(id.kind, FieldKind::Integer);

    let code = &Product::fields()[1];
    assert!(!code.primary_key);
    assert_eq!(code.kind, FieldKind::Text);

    let price = &Product::fields()[3];
    assert_eq!(price.kind, FieldKind::Real);

    let active = &Product::fields()[4];
    assert!(!active.nullable);
    assert_eq!(active.kind, FieldKind::Integer);

    assert_eq!(Product::table(), "products");
}

#[test]
fn cached_accessor_mutates_like_direct_assignment() {
    let mut product = Product::default();

    write_field(&mut product, "qty", Value::Integer(7)).unwrap();
    assert_eq!(product.qty, Some(7));

    // Second pass goes through the memoized index.
    write_field(&mut product, "qty", Value::Integer(9)).unwrap();
    assert_eq!(product.qty, Some(9));

    write_field(&mut product, "code", Value::Text("A1".to_string())).unwrap();
    assert_eq!(product.code, Some("A1".to_string()));

    write_field(&mut product, "code", Value::Null).unwrap();
    assert_eq!(product.code, None);

    write_field(&mut product, "active", Value::Integer(1)).unwrap();
    assert!(product.active);

    assert_eq!(read_field(&product, "qty").unwrap(), Value::Integer(9));
    assert_eq!(read_field(&product, "code").unwrap(), Value::Null);
}

#[test]
fn accessor_rejects_unknown_field() {
    let err = field_of::<Product>("missing").unwrap_err();
    assert!(matches!(err, RecordError::FieldNotFound { .. }));

    // Misses are not cached; the same lookup keeps failing.
    let err = field_of::<Product>("missing").unwrap_err();
    assert!(matches!(err, RecordError::FieldNotFound { .. }));
}

#[test]
fn accessor_rejects_kind_mismatch() {
    let mut product = Product::default();
    let err = write_field(&mut product, "qty", Value::Text("seven".to_string())).unwrap_err();
    assert!(matches!(
        err,
        RecordError::ValueKind { field: "qty", .. }
    ));
    assert_eq!(product.qty, None);
}

#[test]
fn accessors_are_scoped_per_type() {
    let mut product = Product::default();
    let mut sparse = Sparse::default();

    write_field(&mut product, "id", Value::Integer(1)).unwrap();
    write_field(&mut sparse, "id", Value::Integer(2)).unwrap();

    assert_eq!(product.id, Some(1));
    assert_eq!(sparse.id, Some(2));
}

#[test]
fn uuid_fields_round_trip_as_text() {
    let mut tag = Tag::default();
    let ref_id = Uuid::new_v4();

    write_field(&mut tag, "ref_id", Value::Text(ref_id.to_string())).unwrap();
    assert_eq!(tag.ref_id, Some(ref_id));
    assert_eq!(
        read_field(&tag, "ref_id").unwrap(),
        Value::Text(ref_id.to_string())
    );

    let err = write_field(&mut tag, "ref_id", Value::Text("not-a-uuid".to_string())).unwrap_err();
    assert!(matches!(err, RecordError::ValueKind { .. }));
}

#[test]
fn merge_takes_updated_value_when_non_null() {
    let original = Product {
        id: Some(1),
        code: Some("A1".to_string()),
        qty: Some(10),
        price: Some(2.5),
        active: true,
    };
    let updated = Product {
        id: None,
        code: None,
        qty: Some(25),
        price: None,
        active: false,
    };

    let merged = merge_non_null(&original, &updated).unwrap();
    assert_eq!(merged.id, Some(1));
    assert_eq!(merged.code, Some("A1".to_string()));
    assert_eq!(merged.qty, Some(25));
    assert_eq!(merged.price, Some(2.5));
    // Non-nullable fields always come from the update.
    assert!(!merged.active);
}

#[test]
fn merge_is_idempotent() {
    let original = Product {
        id: Some(1),
        code: Some("A1".to_string()),
        qty: Some(10),
        price: None,
        active: true,
    };
    let updated = Product {
        qty: Some(25),
        ..Product::default()
    };

    let merged_once = merge_non_null(&original, &updated).unwrap();
    let merged_twice = merge_non_null(&merged_once, &updated).unwrap();
    assert_eq!(merged_once, merged_twice);
}

#[test]
fn merge_preserves_all_null_fields() {
    let merged = merge_non_null(&Sparse::default(), &Sparse::default()).unwrap();
    assert_eq!(merged, Sparse::default());
}

#[test]
fn where_clause_renders_non_null_fields_in_order() {
    let product = Product {
        id: None,
        code: Some("A1".to_string()),
        qty: Some(3),
        price: None,
        active: true,
    };

    let clause = where_clause(&product).unwrap();
    assert_eq!(clause, "code = 'A1' AND qty = 3 AND active = 1");
}

#[test]
fn where_clause_rejects_all_null_instance() {
    let err = where_clause(&Sparse::default()).unwrap_err();
    assert!(matches!(err, RecordError::EmptyPredicate { .. }));
}
