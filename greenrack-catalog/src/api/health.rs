//! Health endpoint

use axum::Json;
use serde_json::json;

/// GET /health
///
/// Liveness check; no auth, no side effects.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "greenrack-catalog",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
