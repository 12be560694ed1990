//! Bulk image apply pipeline
//!
//! Takes a list of (product, repository image) pairs and pushes each stored
//! image to the POS catalog, one item at a time, emitting a progress event
//! stream: `start` per item, then `success` or `error`, and a single `done`
//! after the whole batch. One item's failure never aborts the batch.
//!
//! Items are processed strictly sequentially to bound load on the POS API
//! and keep event ordering deterministic. If the consumer drops the stream,
//! the current item finishes but no further items are started.

use crate::db::RepositoryStore;
use crate::events::ApplyEvent;
use crate::models::ApplyItem;
use crate::services::pos_client::{PosError, ProductImageSink};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::stream::Stream;
use greenrack_common::cache::PRODUCTS_ALL_KEY;
use greenrack_common::types::{SetImageRequest, SetImageResponse};
use greenrack_common::TtlCache;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum ItemError {
    #[error("Repository image {0} not found")]
    ImageNotFound(i64),

    #[error(transparent)]
    Store(#[from] greenrack_common::Error),

    #[error(transparent)]
    Pos(#[from] PosError),
}

/// Sequential bulk-apply pipeline over a repository store and an image sink
pub struct ApplyPipeline<S> {
    store: RepositoryStore,
    sink: Arc<S>,
    cache: TtlCache,
}

impl<S: ProductImageSink + 'static> ApplyPipeline<S> {
    pub fn new(store: RepositoryStore, sink: Arc<S>, cache: TtlCache) -> Self {
        Self { store, sink, cache }
    }

    /// Run the batch, yielding progress events as items complete.
    ///
    /// The cached product list is invalidated after the last item, before
    /// the terminal `done` event.
    pub fn run(self, items: Vec<ApplyItem>) -> impl Stream<Item = ApplyEvent> + Send {
        async_stream::stream! {
            tracing::info!(items = items.len(), "Starting bulk image apply");

            for item in &items {
                yield ApplyEvent::start(item.product_id, item.product_name.as_deref());

                match self.apply_one(item).await {
                    Ok(result) => {
                        tracing::debug!(
                            product_id = item.product_id,
                            image_id = item.image_id,
                            "Applied repository image"
                        );
                        yield ApplyEvent::success(
                            item.product_id,
                            item.product_name.as_deref(),
                            result,
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            product_id = item.product_id,
                            image_id = item.image_id,
                            "Bulk apply item failed: {}",
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

    async fn apply_one(&self, item: &ApplyItem) -> Result<SetImageResponse, ItemError> {
        let (bytes, file_name, _mime_type) = self
            .store
            .image_data(item.image_id)
            .await?
            .ok_or(ItemError::ImageNotFound(item.image_id))?;

        let request = SetImageRequest {
            product_id: item.product_id,
            base64_image: BASE64.encode(&bytes),
            file_name,
        };
        Ok(self.sink.push_image(&request).await?)
    }
}
