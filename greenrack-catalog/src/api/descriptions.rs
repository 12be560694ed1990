//! Product description endpoint (POS passthrough)

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use greenrack_common::cache::PRODUCTS_ALL_KEY;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDescriptionRequest {
    pub product_id: i64,
    pub description: String,
}

/// POST /api/descriptions/set
///
/// Writes a product's online description to the POS catalog. Only the
/// description is ever changed; see `PosClient::update_online_description`.
pub async fn set_description(
    State(state): State<AppState>,
    Json(req): Json<SetDescriptionRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.description.is_empty() {
        return Err(ApiError::BadRequest(
            "productId and description are required".to_string(),
        ));
    }

    let product = state
        .pos
        .update_online_description(req.product_id, &req.description)
        .await?;

    state.cache.delete(PRODUCTS_ALL_KEY);
    Ok(Json(json!({"success": true, "product": product})))
}
