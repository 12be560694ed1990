//! Product-to-image matching endpoint

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{MatchResult, ProductInput};
use crate::services::RuleMatcher;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub products: Option<Vec<ProductInput>>,
}

/// POST /api/repository/match
///
/// Returns one result per submitted product, in submission order.
pub async fn match_products(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> ApiResult<Json<Vec<MatchResult>>> {
    let products = req
        .products
        .ok_or_else(|| ApiError::BadRequest("products array is required".to_string()))?;

    let matcher = RuleMatcher::new(state.store.clone());
    Ok(Json(matcher.match_products(&products).await?))
}
