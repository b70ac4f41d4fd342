//! Builds parameterized DDL/DML for the per-database `entries` table.
//! Identifiers are quoted; values are always bound, never interpolated. The
//! one unparameterizable input, the ORDER BY column, must be validated against
//! live schema by the caller before it reaches `select_all`.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single implicit table every database carries.
pub const ENTRIES_TABLE: &str = "entries";

/// Identity column, generated by the storage engine on insert.
pub const ID_COLUMN: &str = "id";

/// One client-declared column: name plus a SQLite type token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse; anything but asc/desc is rejected by callers.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// SQL text plus values to bind, in placeholder order.
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Quote identifier for SQLite.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// A declared type token may only carry identifier characters, spaces and
/// parenthesized size arguments (TEXT, INTEGER, VARCHAR(20), NUMERIC(10,2)).
/// Everything else would splice into the DDL and is rejected up front.
fn valid_type_token(token: &str) -> bool {
    !token.trim().is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '(' | ')' | ',' | '_'))
}

/// Reject field definitions that cannot be spliced into DDL safely.
pub fn validate_fields(fields: &[FieldDef]) -> Result<(), AppError> {
    for f in fields {
        if f.key.trim().is_empty() {
            return Err(AppError::BadRequest("field key must not be empty".into()));
        }
        if !valid_type_token(&f.type_) {
            return Err(AppError::BadRequest(format!(
                "invalid type for field '{}'",
                f.key
            )));
        }
    }
    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS entries (id INTEGER PRIMARY KEY, ...)`.
/// First creation wins; a later call with a different field set is a no-op.
pub fn create_table(fields: &[FieldDef]) -> String {
    let mut cols = vec![format!("{} INTEGER PRIMARY KEY", ID_COLUMN)];
    cols.extend(
        fields
            .iter()
            .map(|f| format!("{} {}", quoted(&f.key), f.type_.trim())),
    );
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        ENTRIES_TABLE,
        cols.join(", ")
    )
}

/// INSERT with the payload's own key set as the column list; every value is a
/// bound parameter. An undeclared key fails at the storage layer.
pub fn insert(payload: &Map<String, Value>) -> QueryBuf {
    let mut cols = Vec::with_capacity(payload.len());
    let mut placeholders = Vec::with_capacity(payload.len());
    let mut params = Vec::with_capacity(payload.len());
    for (key, value) in payload {
        cols.push(quoted(key));
        placeholders.push("?".to_string());
        params.push(value.clone());
    }
    QueryBuf {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            ENTRIES_TABLE,
            cols.join(", "),
            placeholders.join(", ")
        ),
        params,
    }
}

/// `SELECT *` over entries, optionally ordered. `sort` must name a column the
/// caller has checked against `PRAGMA table_info`.
pub fn select_all(sort: Option<(&str, SortDirection)>) -> String {
    match sort {
        None => format!("SELECT * FROM {}", ENTRIES_TABLE),
        Some((field, direction)) => format!(
            "SELECT * FROM {} ORDER BY {} {}",
            ENTRIES_TABLE,
            quoted(field),
            direction.as_sql()
        ),
    }
}

/// DELETE by identifier; the id is the sole bound parameter.
pub fn delete_by_id() -> String {
    format!("DELETE FROM {} WHERE {} = ?", ENTRIES_TABLE, ID_COLUMN)
}

/// Live column introspection for the entries table.
pub fn table_info() -> String {
    format!("PRAGMA table_info({})", ENTRIES_TABLE)
}

/// Total row count.
pub fn count_entries() -> String {
    format!("SELECT COUNT(*) FROM {}", ENTRIES_TABLE)
}
