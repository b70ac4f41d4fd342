//! Route table. Sort field and direction are optional trailing path segments,
//! spelled as three explicit routes; the two-segment entries path serves both
//! sorted GET and delete-by-id, disambiguated by method.

use crate::handlers::{
    create_table, database_info, delete_entry, drop_database, insert_entry, list_databases,
    list_entries, list_entries_directed, list_entries_sorted,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/create/:db", post(create_table))
        .route("/api/dbs", get(list_databases))
        .route("/api/entries/:db", get(list_entries).post(insert_entry))
        .route(
            "/api/entries/:db/:field",
            get(list_entries_sorted).delete(delete_entry),
        )
        .route("/api/entries/:db/:field/:direction", get(list_entries_directed))
        .route("/api/info/:db", get(database_info))
        .route("/api/delete/:db", delete(drop_database))
        .with_state(state)
}
