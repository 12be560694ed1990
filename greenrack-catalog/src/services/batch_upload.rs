//! URL batch-upload pipeline
//!
//! Variant of the bulk apply pipeline for images that are not in the
//! repository: each item carries a source URL. The pipeline downloads the
//! bytes, derives a file name from the URL path, and pushes the image to
//! the POS catalog. Same event grammar and partial-failure semantics as
//! the repository apply pipeline.

use crate::events::ApplyEvent;
use crate::models::UploadItem;
use crate::services::pos_client::{PosError, ProductImageSink};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::stream::Stream;
use greenrack_common::cache::PRODUCTS_ALL_KEY;
use greenrack_common::types::{SetImageRequest, SetImageResponse};
use greenrack_common::TtlCache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FILE_NAME: &str = "image.jpg";

#[derive(Debug, Error)]
enum ItemError {
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error(transparent)]
    Pos(#[from] PosError),
}

/// Sequential download-and-push pipeline
pub struct UploadPipeline<S> {
    http_client: reqwest::Client,
    sink: Arc<S>,
    cache: TtlCache,
}

impl<S: ProductImageSink + 'static> UploadPipeline<S> {
    pub fn new(sink: Arc<S>, cache: TtlCache) -> Result<Self, PosError> {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| PosError::Network(e.to_string()))?;
        Ok(Self {
            http_client,
            sink,
            cache,
        })
    }

    pub fn run(self, items: Vec<UploadItem>) -> impl Stream<Item = ApplyEvent> + Send {
        async_stream::stream! {
            tracing::info!(items = items.len(), "Starting URL batch upload");

            for item in &items {
                yield ApplyEvent::start(item.product_id, item.product_name.as_deref());

                match self.upload_one(item).await {
                    Ok(result) => {
                        yield ApplyEvent::success(
                            item.product_id,
                            item.product_name.as_deref(),
                            result,
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            product_id = item.product_id,
                            url = %item.image_url,
                            "Batch upload item failed: {}",
                            e
                        );
                        yield ApplyEvent::error(item.product_id, item.product_name.as_deref(), &e);
                    }
                }
            }

            self.cache.delete(PRODUCTS_ALL_KEY);
            yield ApplyEvent::Done;
        }
    }

    async fn upload_one(&self, item: &UploadItem) -> Result<SetImageResponse, ItemError> {
        let response = self
            .http_client
            .get(&item.image_url)
            .send()
            .await
            .map_err(|e| ItemError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ItemError::Fetch(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ItemError::Fetch(e.to_string()))?;

        let request = SetImageRequest {
            product_id: item.product_id,
            base64_image: BASE64.encode(&bytes),
            file_name: file_name_from_url(&item.image_url),
        };
        Ok(self.sink.push_image(&request).await?)
    }
}

/// Derive a file name from the last path segment of a URL, falling back to
/// a generic name when the URL has no usable path.
fn file_name_from_url(url: &str) -> String {
    let without_suffix = url.split(['?', '#']).next().unwrap_or("");
    let path = without_suffix
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_suffix);

    match path.split_once('/') {
        Some((_, rest)) => rest
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string(),
        None => DEFAULT_FILE_NAME.to_string(),
    }
}
