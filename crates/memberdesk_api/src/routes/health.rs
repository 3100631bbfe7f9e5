//! Health check endpoint.

use axum::Json;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": memberdesk_core::core_version(),
    }))
}
