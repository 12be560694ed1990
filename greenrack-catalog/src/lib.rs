//! greenrack-catalog library — dispensary catalog manager
//!
//! Manages a repository of reusable product images, priority-ordered
//! matching rules that pair those images with POS catalog products, and
//! bulk pipelines that push images to the external POS platform while
//! streaming per-item progress over SSE.

use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod services;

pub use error::{ApiError, ApiResult};

use db::RepositoryStore;
use greenrack_common::TtlCache;
use services::PosClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Image repository and rule storage
    pub store: RepositoryStore,
    /// External POS platform client
    pub pos: Arc<PosClient>,
    /// In-process cache for POS passthrough responses
    pub cache: TtlCache,
}

impl AppState {
    pub fn new(pool: SqlitePool, pos: Arc<PosClient>, cache: TtlCache) -> Self {
        Self {
            store: RepositoryStore::new(pool),
            pos,
            cache,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/api/repository/images",
            get(api::list_images).post(api::create_image),
        )
        .route(
            "/api/repository/images/:id",
            get(api::get_image_data).delete(api::delete_image),
        )
        .route("/api/repository/rules", post(api::create_rule))
        .route("/api/repository/rules/:id", delete(api::delete_rule))
        .route("/api/repository/match", post(api::match_products))
        .route("/api/repository/apply", post(api::apply_images))
        .route("/api/images/upload-batch", post(api::upload_batch))
        .route("/api/images/set", post(api::set_product_image))
        .route("/api/images/remove", post(api::remove_product_image))
        .route("/api/descriptions/set", post(api::set_description))
        .route("/api/products", get(api::get_products))
        .route("/api/categories", get(api::get_categories))
        .route("/api/strains", get(api::get_strains))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
