//! POS passthrough endpoints with TTL caching
//!
//! These endpoints proxy the vendor catalog so the dashboard never talks to
//! the POS directly. Responses are cached in-process; image mutations
//! elsewhere in the service invalidate the product list.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::services::ProductQuery;
use crate::AppState;
use greenrack_common::cache::{CATEGORIES_TTL, PRODUCTS_ALL_KEY, PRODUCTS_TTL, STRAINS_TTL};
use greenrack_common::types::{ProductCategory, ProductDetail, StrainDetail};

const CATEGORIES_KEY: &str = "categories";
const STRAINS_KEY: &str = "strains";

#[derive(Debug, Deserialize)]
pub struct ProductsParams {
    #[serde(rename = "fromLastModifiedDateUTC")]
    pub from_last_modified: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// GET /api/products
pub async fn get_products(
    State(state): State<AppState>,
    Query(params): Query<ProductsParams>,
) -> ApiResult<Json<Vec<ProductDetail>>> {
    let cache_key = match &params.from_last_modified {
        Some(date) => format!("products:from:{}", date),
        None => PRODUCTS_ALL_KEY.to_string(),
    };

    if let Some(cached) = state.cache.get::<Vec<ProductDetail>>(&cache_key) {
        tracing::debug!(key = %cache_key, "Serving products from cache");
        return Ok(Json(cached));
    }

    let products = state
        .pos
        .get_products(&ProductQuery {
            from_last_modified: params.from_last_modified,
            is_active: params.is_active,
        })
        .await?;

    state.cache.set(&cache_key, &products, PRODUCTS_TTL);
    Ok(Json(products))
}

/// GET /api/categories
pub async fn get_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductCategory>>> {
    if let Some(cached) = state.cache.get::<Vec<ProductCategory>>(CATEGORIES_KEY) {
        return Ok(Json(cached));
    }

    let categories = state.pos.get_categories().await?;
    state.cache.set(CATEGORIES_KEY, &categories, CATEGORIES_TTL);
    Ok(Json(categories))
}

/// GET /api/strains
pub async fn get_strains(State(state): State<AppState>) -> ApiResult<Json<Vec<StrainDetail>>> {
    if let Some(cached) = state.cache.get::<Vec<StrainDetail>>(STRAINS_KEY) {
        return Ok(Json(cached));
    }

    let strains = state.pos.get_strains().await?;
    state.cache.set(STRAINS_KEY, &strains, STRAINS_TTL);
    Ok(Json(strains))
}
