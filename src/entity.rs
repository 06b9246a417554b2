//! Mapping between typed records and table rows.
//!
//! A record type implements [`Entity`], usually through the [`entity!`]
//! macro, which lists its persisted fields in declaration order:
//!
//! ```rust
//! use sqlite_comfort::entity;
//!
//! #[derive(Debug, Default)]
//! struct Player {
//!     id: i64,
//!     name: String,
//!     score: f64,
//!     nickname: Option<String>,
//! }
//!
//! entity!(Player {
//!     id: i64,
//!     name: String,
//!     score: f64 => "points",
//!     nickname: Option<String>,
//! });
//! ```
//!
//! [`entity!`]: crate::entity!

use crate::backend::QueryRow;
use crate::error::Result;
use crate::schema::{Column, SqlType, Table};
use crate::value::Value;

/// How a field is stored and bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Bool,
    Blob,
}

impl FieldType {
    pub fn sql_type(&self) -> SqlType {
        match self {
            FieldType::Text => SqlType::Text,
            FieldType::Integer | FieldType::Bool => SqlType::Integer,
            FieldType::Real => SqlType::Real,
            FieldType::Blob => SqlType::Blob,
        }
    }
}

/// Static description of one persisted field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub field_type: FieldType,
    pub optional: bool,
}

/// A Rust type that can live in an entity field.
pub trait FieldValue: Sized {
    const FIELD_TYPE: FieldType;
    const OPTIONAL: bool = false;

    /// `None` marks an unset optional field.
    fn to_value(&self) -> Option<Value>;

    /// `None` when the value cannot be represented by this type.
    fn from_value(value: Value) -> Option<Self>;
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Integer(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FieldValue for i32 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Integer((*self).into()))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

impl FieldValue for u32 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Integer((*self).into()))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_i64().and_then(|i| u32::try_from(i).ok())
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Real;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Real(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FieldValue for f32 {
    const FIELD_TYPE: FieldType = FieldType::Real;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Real((*self).into()))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::Blob;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Blob(self.clone()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// `None` is left out of INSERT and UPDATE column lists; `Some(v)` is written
/// like a required field. A NULL cell decodes to `None`.
impl<T: FieldValue> FieldValue for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const OPTIONAL: bool = true;

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(FieldValue::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }
}

/// A record type mapped to and from table rows.
pub trait Entity: Default {
    /// Persisted fields in declaration order.
    fn fields() -> Vec<FieldDef>;

    /// Column values in declaration order; `None` for unset optional fields.
    fn values(&self) -> Vec<(&'static str, Option<Value>)>;

    /// Assign one decoded column value.
    fn set_column(&mut self, column: &str, value: Value) -> Result<()>;

    /// Columns and values to write, skipping unset optional fields.
    fn persisted_values(&self) -> Vec<(&'static str, Value)> {
        self.values()
            .into_iter()
            .filter_map(|(column, value)| value.map(|v| (column, v)))
            .collect()
    }

    /// Build a fresh record from a result row.
    ///
    /// Columns without a matching field, and values of the wrong type, are
    /// skipped; the field keeps its default.
    fn from_row(row: &QueryRow) -> Self {
        let mut record = Self::default();

        for (column, value) in row.iter() {
            if let Err(err) = record.set_column(column, value.clone()) {
                tracing::debug!(column = %column, error = %err, "skipping column while decoding row");
            }
        }

        record
    }
}

/// Build a table definition from an entity's fields.
///
/// Non-optional fields become NOT NULL; `primary_key` names the primary key
/// column.
pub fn table_for<T: Entity>(name: impl Into<String>, primary_key: &str) -> Table {
    let columns = T::fields()
        .into_iter()
        .map(|field| {
            let mut column = Column::new(field.column, field.field_type.sql_type());
            if field.column == primary_key {
                column = column.primary_key();
            } else if !field.optional {
                column = column.not_null();
            }
            column
        })
        .collect();

    Table::new(name, columns)
}

/// Implement [`Entity`] for a struct from its persisted field list.
///
/// Each entry is `field: Type`, optionally followed by `=> "column"` when the
/// column name differs from the field name.
#[macro_export]
macro_rules! entity {
    (@column $field:ident) => {
        stringify!($field)
    };
    (@column $field:ident $column:literal) => {
        $column
    };
    ($ty:ty { $($field:ident : $fty:ty $(=> $column:literal)?),* $(,)? }) => {
        impl $crate::entity::Entity for $ty {
            fn fields() -> ::std::vec::Vec<$crate::entity::FieldDef> {
                ::std::vec![$(
                    $crate::entity::FieldDef {
                        name: stringify!($field),
                        column: $crate::entity!(@column $field $($column)?),
                        field_type: <$fty as $crate::entity::FieldValue>::FIELD_TYPE,
                        optional: <$fty as $crate::entity::FieldValue>::OPTIONAL,
                    }
                ),*]
            }

            fn values(
                &self,
            ) -> ::std::vec::Vec<(&'static str, ::std::option::Option<$crate::Value>)> {
                ::std::vec![$(
                    (
                        $crate::entity!(@column $field $($column)?),
                        $crate::entity::FieldValue::to_value(&self.$field),
                    )
                ),*]
            }

            fn set_column(&mut self, column: &str, value: $crate::Value) -> $crate::Result<()> {
                $(
                    if column == $crate::entity!(@column $field $($column)?) {
                        let found = value.type_name();
                        return match <$fty as $crate::entity::FieldValue>::from_value(value) {
                            ::std::option::Option::Some(v) => {
                                self.$field = v;
                                ::std::result::Result::Ok(())
                            }
                            ::std::option::Option::None => {
                                ::std::result::Result::Err($crate::QueryError::TypeMapping(
                                    ::std::format!(
                                        "column {} expects {:?}, found {}",
                                        column,
                                        <$fty as $crate::entity::FieldValue>::FIELD_TYPE,
                                        found,
                                    ),
                                ))
                            }
                        };
                    }
                )*
                ::std::result::Result::Err($crate::QueryError::UnknownColumn(column.to_string()))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    #[derive(Debug, Default, PartialEq)]
    struct Player {
        id: i64,
        name: String,
        score: f64,
        active: bool,
        avatar: Vec<u8>,
        nickname: Option<String>,
    }

    crate::entity!(Player {
        id: i64,
        name: String,
        score: f64 => "points",
        active: bool,
        avatar: Vec<u8>,
        nickname: Option<String>,
    });

    fn row(cells: Vec<(&str, Value)>) -> QueryRow {
        let mut row = QueryRow::new();
        for (column, value) in cells {
            row.insert(column.to_string(), value);
        }
        row
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let fields = Player::fields();
        let columns: Vec<_> = fields.iter().map(|f| f.column).collect();
        assert_eq!(columns, vec!["id", "name", "points", "active", "avatar", "nickname"]);

        assert_eq!(fields[2].name, "score");
        assert_eq!(fields[2].field_type, FieldType::Real);
        assert_eq!(fields[3].field_type, FieldType::Bool);
        assert!(fields[5].optional);
        assert!(!fields[0].optional);
    }

    #[test]
    fn test_persisted_values_skip_unset_optionals() {
        let player = Player {
            id: 1,
            name: "Ada".to_string(),
            score: 2.5,
            active: true,
            avatar: vec![1],
            nickname: None,
        };

        let values = player.persisted_values();
        let columns: Vec<_> = values.iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["id", "name", "points", "active", "avatar"]);
        assert_eq!(values[3].1, Value::Bool(true));

        let named = Player {
            nickname: Some("ace".to_string()),
            ..player
        };
        assert_eq!(named.persisted_values().len(), 6);
    }

    #[test]
    fn test_from_row() {
        let player = Player::from_row(&row(vec![
            ("id", Value::Integer(7)),
            ("name", Value::from("Grace")),
            ("points", Value::Real(9.5)),
            ("active", Value::Integer(1)),
            ("avatar", Value::Blob(vec![0xff])),
            ("nickname", Value::Null),
        ]));

        assert_eq!(
            player,
            Player {
                id: 7,
                name: "Grace".to_string(),
                score: 9.5,
                active: true,
                avatar: vec![0xff],
                nickname: None,
            }
        );
    }

    #[test]
    fn test_from_row_skips_unknown_and_mismatched_columns() {
        let player = Player::from_row(&row(vec![
            ("id", Value::Integer(3)),
            ("extra", Value::from("ignored")),
            ("name", Value::Integer(5)),
        ]));

        assert_eq!(player.id, 3);
        assert_eq!(player.name, "");
    }

    #[test]
    fn test_set_column_errors() {
        let mut player = Player::default();
        assert!(matches!(
            player.set_column("missing", Value::Null),
            Err(QueryError::UnknownColumn(_))
        ));
        assert!(matches!(
            player.set_column("id", Value::from("x")),
            Err(QueryError::TypeMapping(_))
        ));
        assert!(player.set_column("points", Value::Integer(4)).is_ok());
        assert_eq!(player.score, 4.0);
    }

    #[test]
    fn test_table_for_entity() {
        let table = table_for::<Player>("players", "id");
        assert_eq!(
            table.create_statement(),
            "CREATE TABLE IF NOT EXISTS players(\
             id INTEGER PRIMARY KEY,\
             name TEXT NOT NULL,\
             points REAL NOT NULL,\
             active INTEGER NOT NULL,\
             avatar BLOB NOT NULL,\
             nickname TEXT);"
        );
    }
}
