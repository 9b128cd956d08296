//! Match-by-example WHERE clause synthesis.
//!
//! # Responsibility
//! - Render an instance's non-null fields as an equality predicate.
//!
//! # Invariants
//! - Fields are visited in declaration order and joined with ` AND `.
//! - Values are rendered as SQL literals without escaping. Callers must not
//!   feed field values sourced from untrusted input.

use super::{Record, RecordError, RecordResult};
use rusqlite::types::Value;

/// Builds an equality predicate over all non-null fields of `item`.
///
/// Text-kind values are single-quoted, blobs rendered as `X'..'` literals,
/// numbers in their default textual form.
///
/// # Errors
/// - `RecordError::EmptyPredicate` when every field of `item` is null.
pub fn where_clause<T: Record>(item: &T) -> RecordResult<String> {
    let mut clause = String::new();
    for def in T::fields() {
        let value = (def.get)(item);
        if matches!(value, Value::Null) {
            continue;
        }
        if !clause.is_empty() {
            clause.push_str(" AND ");
        }
        clause.push_str(def.name);
        clause.push_str(" = ");
        clause.push_str(&render_literal(&value));
    }

    if clause.is_empty() {
        return Err(RecordError::EmptyPredicate {
            record: std::any::type_name::<T>(),
        });
    }
    Ok(clause)
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(text) => format!("'{text}'"),
        Value::Blob(bytes) => {
            let mut literal = String::with_capacity(3 + bytes.len() * 2);
            literal.push_str("X'");
            for byte in bytes {
                literal.push_str(&format!("{byte:02X}"));
            }
            literal.push('\'');
            literal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::render_literal;
    use rusqlite::types::Value;

    #[test]
    fn literals_quote_text_but_not_numbers() {
        assert_eq!(render_literal(&Value::Integer(42)), "42");
        assert_eq!(render_literal(&Value::Text("abc".into())), "'abc'");
    }

    #[test]
    fn blob_literal_is_uppercase_hex() {
        assert_eq!(
            render_literal(&Value::Blob(vec![0x00, 0xAB, 0xFF])),
            "X'00ABFF'"
        );
    }
}
