//! Single-product image endpoints (POS passthrough)

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use greenrack_common::cache::PRODUCTS_ALL_KEY;
use greenrack_common::types::{
    DeleteImageRequest, SetImageRequest, SetImageResponse, SuccessResult,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProductImageRequest {
    pub product_id: i64,
    pub base64_image: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// POST /api/images/set
pub async fn set_product_image(
    State(state): State<AppState>,
    Json(req): Json<SetProductImageRequest>,
) -> ApiResult<Json<SetImageResponse>> {
    if req.base64_image.is_empty() {
        return Err(ApiError::BadRequest(
            "productId and base64Image are required".to_string(),
        ));
    }

    let result = state
        .pos
        .set_image(&SetImageRequest {
            product_id: req.product_id,
            base64_image: req.base64_image,
            file_name: req.file_name.unwrap_or_else(|| "image.jpg".to_string()),
        })
        .await?;

    state.cache.delete(PRODUCTS_ALL_KEY);
    Ok(Json(result))
}

/// POST /api/images/remove
pub async fn remove_product_image(
    State(state): State<AppState>,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Json<SuccessResult>> {
    let result = state.pos.remove_image(&req).await?;
    state.cache.delete(PRODUCTS_ALL_KEY);
    Ok(Json(result))
}
