//! Entry CRUD execution against one database handle.

use crate::error::AppError;
use crate::sql::{self, FieldDef, SortDirection, SqliteBindValue};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

/// Column metadata and row count for one database, per the info route.
#[derive(Serialize)]
pub struct DatabaseInfo {
    #[serde(rename = "entryCount")]
    pub entry_count: i64,
    pub fields: Vec<FieldDef>,
}

pub struct EntryService;

impl EntryService {
    /// Issue the CREATE TABLE IF NOT EXISTS for a client-declared field set.
    /// Once the table exists, later calls are silently a no-op regardless of
    /// their field set.
    pub async fn create_table(pool: &SqlitePool, fields: &[FieldDef]) -> Result<(), AppError> {
        sql::validate_fields(fields)?;
        let ddl = sql::create_table(fields);
        tracing::debug!(sql = %ddl, "create table");
        sqlx::query(&ddl).execute(pool).await?;
        Ok(())
    }

    /// Insert one row from an arbitrary payload; the payload's own key set is
    /// the column list. Returns the generated id merged with the payload.
    pub async fn insert(pool: &SqlitePool, payload: &Map<String, Value>) -> Result<Value, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("payload must not be empty".into()));
        }
        let q = sql::insert(payload);
        tracing::debug!(sql = %q.sql, params = ?q.params, "insert");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(SqliteBindValue::from_json(p)?);
        }
        let result = query.execute(pool).await?;
        let id = result.last_insert_rowid();
        tracing::debug!(id, "row inserted");

        let mut row = Map::new();
        row.insert(sql::ID_COLUMN.to_string(), id.into());
        row.extend(payload.clone());
        Ok(Value::Object(row))
    }

    /// List all rows, optionally ordered. The sort field is checked against
    /// live introspection before any query runs; the direction keyword comes
    /// from the validated enum. Nothing client-supplied is spliced unchecked.
    pub async fn list(
        pool: &SqlitePool,
        sort: Option<(String, SortDirection)>,
    ) -> Result<Vec<Value>, AppError> {
        let sort = match &sort {
            None => None,
            Some((field, direction)) => {
                let columns = Self::columns(pool).await?;
                if !columns.iter().any(|c| c.key == *field) {
                    return Err(AppError::BadRequest(format!(
                        "unknown sort field '{}'",
                        field
                    )));
                }
                Some((field.as_str(), *direction))
            }
        };
        let sql = sql::select_all(sort);
        tracing::debug!(sql = %sql, "list");
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Delete at most one row by id. Deleting a missing id succeeds the same
    /// way a real deletion does; callers cannot tell the two apart.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
        let sql = sql::delete_by_id();
        tracing::debug!(sql = %sql, id, "delete");
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        tracing::debug!(rows = result.rows_affected(), "delete done");
        Ok(())
    }

    /// Declared columns (name + type) excluding the identity column, plus the
    /// row count. Two sequential reads, no transactional consistency between
    /// them.
    pub async fn info(pool: &SqlitePool) -> Result<DatabaseInfo, AppError> {
        let fields = Self::columns(pool)
            .await?
            .into_iter()
            .filter(|c| c.key != sql::ID_COLUMN)
            .collect();
        let entry_count: i64 = sqlx::query_scalar(&sql::count_entries())
            .fetch_one(pool)
            .await?;
        Ok(DatabaseInfo {
            entry_count,
            fields,
        })
    }

    /// Live column metadata from `PRAGMA table_info`. Empty when the entries
    /// table does not exist yet.
    pub async fn columns(pool: &SqlitePool) -> Result<Vec<FieldDef>, AppError> {
        use sqlx::Row;
        let rows = sqlx::query(&sql::table_info()).fetch_all(pool).await?;
        rows.iter()
            .map(|row| {
                Ok(FieldDef {
                    key: row.try_get("name")?,
                    type_: row.try_get("type")?,
                })
            })
            .collect()
    }
}

fn row_to_json(row: &SqliteRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = Map::new();
    for col in row.columns() {
        map.insert(col.name().to_string(), cell_to_value(row, col.ordinal()));
    }
    Value::Object(map)
}

/// Map one cell by its storage class. SQLite cells are dynamically typed, so
/// the value's own type is authoritative, not the declared column type.
fn cell_to_value(row: &SqliteRow, idx: usize) -> Value {
    use sqlx::{Row, TypeInfo, ValueRef};
    let Ok(raw) = row.try_get_raw(idx) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }
    match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(idx)
            .map(|n| Value::Number(n.into()))
            .unwrap_or(Value::Null),
        "REAL" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn pool() -> SqlitePool {
        let provider = crate::store::HandleProvider::shared_in_memory()
            .await
            .unwrap();
        provider.acquire("t").await.unwrap().pool().clone()
    }

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef {
                key: "name".into(),
                type_: "TEXT".into(),
            },
            FieldDef {
                key: "age".into(),
                type_: "INTEGER".into(),
            },
        ]
    }

    fn payload(name: &str, age: i64) -> Map<String, Value> {
        let Value::Object(m) = json!({"name": name, "age": age}) else {
            unreachable!()
        };
        m
    }

    #[tokio::test]
    async fn insert_returns_id_merged_with_payload() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        let row = EntryService::insert(&pool, &payload("John", 30)).await.unwrap();
        assert_eq!(row, json!({"id": 1, "name": "John", "age": 30}));
    }

    #[tokio::test]
    async fn ids_increase_per_insert() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        for expected in 1..=3 {
            let row = EntryService::insert(&pool, &payload("x", expected)).await.unwrap();
            assert_eq!(row["id"], json!(expected));
        }
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_before_sql() {
        let pool = pool().await;
        let err = EntryService::insert(&pool, &Map::new()).await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn undeclared_column_surfaces_storage_error() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        let Value::Object(bad) = json!({"ghost": 1}) else { unreachable!() };
        let err = EntryService::insert(&pool, &bad).await;
        assert!(matches!(err, Err(AppError::Db(_))));
    }

    #[tokio::test]
    async fn list_sorts_desc_when_asked() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        for age in [30, 10, 20] {
            EntryService::insert(&pool, &payload("p", age)).await.unwrap();
        }
        let rows = EntryService::list(&pool, Some(("age".into(), SortDirection::Desc)))
            .await
            .unwrap();
        let ages: Vec<i64> = rows.iter().map(|r| r["age"].as_i64().unwrap()).collect();
        assert_eq!(ages, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn unknown_sort_field_never_reaches_the_engine() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        let err = EntryService::list(&pool, Some(("ghost".into(), SortDirection::Asc))).await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn create_table_twice_keeps_first_schema() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        let other = vec![FieldDef {
            key: "color".into(),
            type_: "TEXT".into(),
        }];
        EntryService::create_table(&pool, &other).await.unwrap();
        let info = EntryService::info(&pool).await.unwrap();
        assert_eq!(info.fields, fields());
    }

    #[tokio::test]
    async fn info_on_empty_table_counts_zero_and_omits_id() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        let info = EntryService::info(&pool).await.unwrap();
        assert_eq!(info.entry_count, 0);
        assert!(info.fields.iter().all(|f| f.key != "id"));
        assert_eq!(info.fields.len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_id_is_indistinguishable_from_real_delete() {
        let pool = pool().await;
        EntryService::create_table(&pool, &fields()).await.unwrap();
        EntryService::insert(&pool, &payload("John", 30)).await.unwrap();
        EntryService::delete(&pool, 1).await.unwrap();
        EntryService::delete(&pool, 999).await.unwrap();
        let rows = EntryService::list(&pool, None).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn null_and_real_cells_round_trip() {
        let pool = pool().await;
        let f = vec![
            FieldDef {
                key: "note".into(),
                type_: "TEXT".into(),
            },
            FieldDef {
                key: "score".into(),
                type_: "REAL".into(),
            },
        ];
        EntryService::create_table(&pool, &f).await.unwrap();
        let Value::Object(p) = json!({"note": null, "score": 1.5}) else {
            unreachable!()
        };
        EntryService::insert(&pool, &p).await.unwrap();
        let rows = EntryService::list(&pool, None).await.unwrap();
        assert_eq!(rows[0]["note"], Value::Null);
        assert_eq!(rows[0]["score"], json!(1.5));
    }
}
