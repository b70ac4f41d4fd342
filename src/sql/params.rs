//! Convert serde_json::Value to types that sqlx can bind.

use crate::error::AppError;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::sqlite::Sqlite;
use sqlx::Database;

/// A value that can be bound to a SQLite statement. Converts from
/// serde_json::Value; arrays and objects have no SQLite cell representation
/// and are rejected as client errors.
#[derive(Clone, Debug)]
pub enum SqliteBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl SqliteBindValue {
    pub fn from_json(v: &Value) -> Result<Self, AppError> {
        Ok(match v {
            Value::Null => SqliteBindValue::Null,
            Value::Bool(b) => SqliteBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqliteBindValue::I64(i)
                } else if let Some(f) = n.as_f64() {
                    SqliteBindValue::F64(f)
                } else {
                    SqliteBindValue::I64(n.as_i64().unwrap_or(0))
                }
            }
            Value::String(s) => SqliteBindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::BadRequest(
                    "values must be strings, numbers, booleans or null".into(),
                ))
            }
        })
    }
}

impl<'q> Encode<'q, Sqlite> for SqliteBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            SqliteBindValue::Null => {
                <Option<i64> as Encode<Sqlite>>::encode_by_ref(&None, buf)?
            }
            SqliteBindValue::Bool(b) => <bool as Encode<Sqlite>>::encode_by_ref(b, buf)?,
            SqliteBindValue::I64(n) => <i64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            SqliteBindValue::F64(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf)?,
            SqliteBindValue::Text(s) => <String as Encode<Sqlite>>::encode(s.clone(), buf)?,
        })
    }
}

impl sqlx::Type<Sqlite> for SqliteBindValue {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<Sqlite>>::type_info()
    }

    fn compatible(_ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        true
    }
}
