//! Bulk pipeline endpoints (SSE)
//!
//! Both endpoints stream progress events as SSE `data:` frames while the
//! batch runs, so the dashboard can render per-item outcomes live instead
//! of waiting for the whole batch.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::events::ApplyEvent;
use crate::models::{ApplyItem, UploadItem};
use crate::services::{ApplyPipeline, UploadPipeline};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub items: Option<Vec<ApplyItem>>,
}

#[derive(Debug, Deserialize)]
pub struct UploadBatchRequest {
    #[serde(default)]
    pub items: Option<Vec<UploadItem>>,
}

/// POST /api/repository/apply
///
/// Streams one `start` + `success`/`error` pair per item and a terminal
/// `done`. An empty or missing item list is rejected before any event.
pub async fn apply_images(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<Response> {
    let items = req.items.unwrap_or_default();
    if items.is_empty() {
        return Err(ApiError::BadRequest("items array is required".to_string()));
    }

    let pipeline = ApplyPipeline::new(state.store.clone(), state.pos.clone(), state.cache.clone());
    Ok(sse_response(pipeline.run(items)))
}

/// POST /api/images/upload-batch
///
/// Same event contract as the repository apply endpoint, but items carry a
/// source URL instead of a repository image id.
pub async fn upload_batch(
    State(state): State<AppState>,
    Json(req): Json<UploadBatchRequest>,
) -> ApiResult<Response> {
    let items = req.items.unwrap_or_default();
    if items.is_empty() {
        return Err(ApiError::BadRequest("items array is required".to_string()));
    }

    let pipeline = UploadPipeline::new(state.pos.clone(), state.cache.clone())?;
    Ok(sse_response(pipeline.run(items)))
}

fn sse_response(events: impl Stream<Item = ApplyEvent> + Send + 'static) -> Response {
    let stream = events.filter_map(|event| async move {
        // Serialization of ApplyEvent cannot produce invalid JSON; a frame
        // that fails to encode is dropped rather than killing the stream.
        Event::default().json_data(&event).ok().map(Ok::<_, Infallible>)
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
        .into_response()
}
