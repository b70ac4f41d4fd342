//! Database-level handlers: enumeration, column/count info, deletion.

use crate::error::AppError;
use crate::service::EntryService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn list_databases(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let names = state.provider.list_databases().await?;
    Ok((StatusCode::OK, Json(names)))
}

pub async fn database_info(
    State(state): State<AppState>,
    Path(db): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.provider.acquire(&db).await?;
    let result = EntryService::info(handle.pool()).await;
    handle.release().await;
    Ok((StatusCode::OK, Json(result?)))
}

pub async fn drop_database(
    State(state): State<AppState>,
    Path(db): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(db = %db, "delete database");
    state.provider.delete_database(&db).await?;
    Ok(StatusCode::NO_CONTENT)
}
