//! Repository image and matching-rule endpoints

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::models::{MatchingRule, NewImage, NewRule, RepositoryImage};
use crate::AppState;

/// GET /api/repository/images
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Json<Vec<RepositoryImage>>> {
    Ok(Json(state.store.list_images().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub name: String,
    pub base64_image: String,
    pub file_name: String,
    pub mime_type: String,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// POST /api/repository/images
pub async fn create_image(
    State(state): State<AppState>,
    Json(req): Json<CreateImageRequest>,
) -> ApiResult<Json<RepositoryImage>> {
    let image_data = BASE64
        .decode(&req.base64_image)
        .map_err(|_| ApiError::BadRequest("base64Image is not valid base64".to_string()))?;

    let created = state
        .store
        .create_image(NewImage {
            name: req.name,
            file_name: req.file_name,
            mime_type: req.mime_type,
            image_data,
            group_name: req.group_name,
        })
        .await?;

    Ok(Json(created))
}

/// GET /api/repository/images/:id
///
/// Serves the stored bytes with the stored content type. Repository images
/// are immutable, so clients may cache them indefinitely.
pub async fn get_image_data(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let (bytes, _file_name, mime_type) = state
        .store
        .image_data(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Repository image {} not found", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/repository/images/:id
///
/// Always reports success; deleting an absent image is a no-op.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store.delete_image(id).await?;
    Ok(Json(json!({"success": true})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    #[serde(default)]
    pub image_id: Option<i64>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub strain: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
    #[serde(default)]
    pub product_name_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// POST /api/repository/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> ApiResult<Json<MatchingRule>> {
    let image_id = req
        .image_id
        .ok_or_else(|| ApiError::BadRequest("imageId is required".to_string()))?;

    let created = state
        .store
        .create_rule(NewRule {
            image_id,
            brand_name: req.brand_name,
            category: req.category,
            strain: req.strain,
            strain_type: req.strain_type,
            product_name_keywords: req.product_name_keywords,
            priority: req.priority,
        })
        .await?;

    Ok(Json(created))
}

/// DELETE /api/repository/rules/:id
///
/// Always reports success; deleting an absent rule is a no-op.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store.delete_rule(id).await?;
    Ok(Json(json!({"success": true})))
}
