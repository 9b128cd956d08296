//! Record metadata contracts and field value conversions.
//!
//! # Responsibility
//! - Define the registration-time metadata every persistable type exposes.
//! - Convert between Rust field types and SQLite storage values.
//!
//! # Invariants
//! - `Record::fields()` returns fields in declaration order, stable for the
//!   process lifetime.
//! - `Value::Null` is the only representation of an absent field value.

use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod accessor;
mod macros;
pub mod merge;
pub mod predicate;

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from record metadata lookups and value conversions.
#[derive(Debug)]
pub enum RecordError {
    /// Named field is not registered on the record type.
    FieldNotFound { record: &'static str, field: String },
    /// Record type registers no primary-key field.
    MissingPrimaryKey { record: &'static str },
    /// Stored value variant does not match the field's declared kind.
    ValueKind {
        field: &'static str,
        expected: FieldKind,
        got: &'static str,
    },
    /// Sequential tag placed on a non-integer field.
    SequentialKind {
        record: &'static str,
        field: &'static str,
        kind: FieldKind,
    },
    /// Match-by-example input carried no non-null fields.
    EmptyPredicate { record: &'static str },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldNotFound { record, field } => {
                write!(f, "field `{field}` is not registered on `{record}`")
            }
            Self::MissingPrimaryKey { record } => {
                write!(f, "`{record}` registers no primary-key field")
            }
            Self::ValueKind {
                field,
                expected,
                got,
            } => write!(
                f,
                "field `{field}` expects a {expected} value, got {got}"
            ),
            Self::SequentialKind {
                record,
                field,
                kind,
            } => write!(
                f,
                "sequential field `{record}.{field}` must be integer-kind, found {kind}"
            ),
            Self::EmptyPredicate { record } => {
                write!(f, "`{record}` instance has no non-null fields to match on")
            }
        }
    }
}

impl Error for RecordError {}

/// Storage kind of a field, mirroring SQLite's fundamental types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Real,
    Text,
    Blob,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
        };
        write!(f, "{name}")
    }
}

/// One registered field: descriptor plus its read/write accessor pair.
///
/// Built once per type at registration time, so no runtime type inspection
/// happens on operation hot paths.
#[derive(Debug)]
pub struct FieldDef<T> {
    /// Column name, identical to the struct field name.
    pub name: &'static str,
    /// Declared storage kind.
    pub kind: FieldKind,
    /// Whether the field can hold `Value::Null`.
    pub nullable: bool,
    /// Primary-key tag; at most one per record type is honored.
    pub primary_key: bool,
    /// Server-sequential tag consumed by the autoincrement engine.
    pub sequential: bool,
    /// Reads the field as a storage value.
    pub get: fn(&T) -> Value,
    /// Writes a storage value into the field.
    pub set: fn(&mut T, Value) -> RecordResult<()>,
}

/// Metadata contract for a persistable record type.
///
/// `Default` supplies the zero-value state used when loading rows and when
/// soft-deleting. Implementations are normally generated with
/// [`impl_record!`](crate::impl_record).
pub trait Record: Default + Sized + 'static {
    /// Mapped table name.
    fn table() -> &'static str;
    /// Registered fields in declaration order.
    fn fields() -> &'static [FieldDef<Self>];
}

/// Returns the primary-key field of `T`, if one is registered.
pub fn primary_key_of<T: Record>() -> RecordResult<&'static FieldDef<T>> {
    T::fields()
        .iter()
        .find(|def| def.primary_key)
        .ok_or(RecordError::MissingPrimaryKey {
            record: std::any::type_name::<T>(),
        })
}

/// Conversion between a Rust field type and its SQLite storage value.
pub trait FieldValue: Sized {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    fn into_value(self) -> Value;
    fn from_value(field: &'static str, value: Value) -> RecordResult<Self>;
}

fn kind_mismatch<T>(field: &'static str, expected: FieldKind, value: &Value) -> RecordResult<T> {
    Err(RecordError::ValueKind {
        field,
        expected,
        got: value_variant(value),
    })
}

fn value_variant(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

impl FieldValue for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for i32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Integer(v) => i32::try_from(v).map_err(|_| RecordError::ValueKind {
                field,
                expected: Self::KIND,
                got: "integer out of range",
            }),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::Real;

    fn into_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Real(v) => Ok(v),
            // SQLite numeric affinity may hand back whole reals as integers.
            Value::Integer(v) => Ok(v as f64),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Integer;

    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Text(text) => Ok(text),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: FieldKind = FieldKind::Blob;

    fn into_value(self) -> Value {
        Value::Blob(self)
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl FieldValue for Uuid {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Text(text) => Uuid::parse_str(&text).map_err(|_| RecordError::ValueKind {
                field,
                expected: Self::KIND,
                got: "non-uuid text",
            }),
            other => kind_mismatch(field, Self::KIND, &other),
        }
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    const KIND: FieldKind = V::KIND;
    const NULLABLE: bool = true;

    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(field: &'static str, value: Value) -> RecordResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => V::from_value(field, other).map(Some),
        }
    }
}
