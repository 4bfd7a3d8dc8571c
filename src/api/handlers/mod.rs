use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::store::FileStore;

// ============================================================
// Error Handling
// ============================================================

/// Log a storage error and return a sanitized response to the client.
/// The full error (including the file path) stays in the server log.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Storage error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Document
// ============================================================

/// Return the last saved document verbatim, or the empty document if nothing
/// has been saved or the file is unreadable as JSON.
pub async fn get_data(State(store): State<FileStore>) -> Result<Json<Value>, (StatusCode, String)> {
    store.read().map(Json).map_err(internal_error)
}

/// Overwrite the stored document with the request body.
pub async fn save_data(
    State(store): State<FileStore>,
    Json(document): Json<Value>,
) -> Result<&'static str, (StatusCode, String)> {
    store.write(&document).map_err(internal_error)?;
    Ok("Data saved successfully")
}
