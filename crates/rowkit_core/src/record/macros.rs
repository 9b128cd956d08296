//! Record registration macro.
//!
//! # Responsibility
//! - Generate `Record` impls from a declarative field list, so record owners
//!   register metadata once instead of hand-writing accessor tables.

/// Registers a struct as a persistable record.
///
/// Field order is declaration order. Flags: `key` marks the primary key,
/// `seq` marks a server-sequential field.
///
/// ```
/// use rowkit_core::impl_record;
///
/// #[derive(Debug, Default, Clone)]
/// struct Shelf {
///     id: Option<i64>,
///     label: Option<String>,
/// }
///
/// impl_record!(Shelf => "shelves" {
///     id: Option<i64> [key],
///     label: Option<String>,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty => $table:literal {
        $($field:ident : $fty:ty $([$($flag:ident),+ $(,)?])?),+ $(,)?
    }) => {
        impl $crate::record::Record for $ty {
            fn table() -> &'static str {
                $table
            }

            fn fields() -> &'static [$crate::record::FieldDef<Self>] {
                static FIELDS: &[$crate::record::FieldDef<$ty>] = &[
                    $(
                        $crate::record::FieldDef {
                            name: stringify!($field),
                            kind: <$fty as $crate::record::FieldValue>::KIND,
                            nullable: <$fty as $crate::record::FieldValue>::NULLABLE,
                            primary_key: false $($(|| $crate::__record_flag!($flag key))+)?,
                            sequential: false $($(|| $crate::__record_flag!($flag seq))+)?,
                            get: |item: &$ty| {
                                $crate::record::FieldValue::into_value(item.$field.clone())
                            },
                            set: |item: &mut $ty, value| {
                                match <$fty as $crate::record::FieldValue>::from_value(
                                    stringify!($field),
                                    value,
                                ) {
                                    Ok(converted) => {
                                        item.$field = converted;
                                        Ok(())
                                    }
                                    Err(err) => Err(err),
                                }
                            },
                        },
                    )+
                ];
                FIELDS
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_flag {
    (key key) => {
        true
    };
    (seq seq) => {
        true
    };
    ($other:ident $want:ident) => {
        false
    };
}
