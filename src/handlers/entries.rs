//! Entry handlers: table creation, insert, list (with optional sort), delete.

use crate::error::AppError;
use crate::service::EntryService;
use crate::sql::{FieldDef, SortDirection};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};

/// Strict field shape: `{"fields": [{"key": ..., "type": ...}, ...]}`. The
/// historical mapping form is rejected along with everything else non-array.
fn parse_fields(body: &Value) -> Result<Vec<FieldDef>, AppError> {
    let items = body
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::BadRequest("Fields must be an array".into()))?;
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|_| {
                AppError::BadRequest(
                    "each field must be an object with string 'key' and 'type'".into(),
                )
            })
        })
        .collect()
}

/// The insert body carries the payload as a JSON string under `data`.
fn parse_payload(body: &Value) -> Result<Map<String, Value>, AppError> {
    let data = body
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("body must contain a 'data' JSON string".into()))?;
    let payload: Value = serde_json::from_str(data)
        .map_err(|e| AppError::BadRequest(format!("invalid payload JSON: {}", e)))?;
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("payload must be a JSON object".into())),
    }
}

pub async fn create_table(
    State(state): State<AppState>,
    Path(db): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let fields = parse_fields(&body)?;
    tracing::info!(db = %db, fields = fields.len(), "create table");
    let handle = state.provider.acquire(&db).await?;
    let result = EntryService::create_table(handle.pool(), &fields).await;
    handle.release().await;
    result?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Table created successfully" })),
    ))
}

pub async fn insert_entry(
    State(state): State<AppState>,
    Path(db): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_payload(&body)?;
    let handle = state.provider.acquire(&db).await?;
    let result = EntryService::insert(handle.pool(), &payload).await;
    handle.release().await;
    Ok((StatusCode::CREATED, Json(result?)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Path(db): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    run_list(&state, &db, None).await
}

pub async fn list_entries_sorted(
    State(state): State<AppState>,
    Path((db, field)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    run_list(&state, &db, Some((field, SortDirection::Asc))).await
}

pub async fn list_entries_directed(
    State(state): State<AppState>,
    Path((db, field, direction)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let direction = SortDirection::parse(&direction)
        .ok_or_else(|| AppError::BadRequest("direction must be 'asc' or 'desc'".into()))?;
    run_list(&state, &db, Some((field, direction))).await
}

async fn run_list(
    state: &AppState,
    db: &str,
    sort: Option<(String, SortDirection)>,
) -> Result<(StatusCode, Json<Vec<Value>>), AppError> {
    let handle = state.provider.acquire(db).await?;
    let result = EntryService::list(handle.pool(), sort).await;
    handle.release().await;
    Ok((StatusCode::OK, Json(result?)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((db, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))?;
    let handle = state.provider.acquire(&db).await?;
    let result = EntryService::delete(handle.pool(), id).await;
    handle.release().await;
    result?;
    Ok(StatusCode::NO_CONTENT)
}
