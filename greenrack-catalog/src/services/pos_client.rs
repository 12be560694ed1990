//! POS platform API client
//!
//! Thin reqwest wrapper over the dispensary point-of-sale REST API. All
//! requests carry a static Authorization header issued per store by the
//! vendor. Failures are never retried here; callers decide whether a whole
//! batch is worth re-running.

use async_trait::async_trait;
use greenrack_common::types::{
    DeleteImageRequest, ProductCategory, ProductDetail, SetImageRequest, SetImageResponse,
    StrainDetail, SuccessResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// POS client errors
#[derive(Debug, Error)]
pub enum PosError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("POS API {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Product {0} not found")]
    ProductNotFound(i64),
}

/// Query parameters for the products endpoint
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub from_last_modified: Option<String>,
    pub is_active: Option<bool>,
}

/// Abstraction over the POS set-image operation, so the bulk pipelines can
/// run against a test double.
#[async_trait]
pub trait ProductImageSink: Send + Sync {
    async fn push_image(&self, req: &SetImageRequest) -> Result<SetImageResponse, PosError>;
}

/// POS platform API client
pub struct PosClient {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl PosClient {
    pub fn new(base_url: &str, auth_token: &str) -> Result<Self, PosError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PosError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: auth_token.to_string(),
        })
    }

    /// Fetch products, optionally filtered by modification date and active
    /// status.
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Vec<ProductDetail>, PosError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(from) = &query.from_last_modified {
            params.push(("fromLastModifiedDateUTC", from.clone()));
        }
        if let Some(active) = query.is_active {
            params.push(("isActive", active.to_string()));
        }

        tracing::debug!(params = params.len(), "Fetching products from POS");
        self.get_json("/products", &params).await
    }

    pub async fn get_categories(&self) -> Result<Vec<ProductCategory>, PosError> {
        self.get_json("/product-category", &[]).await
    }

    pub async fn get_strains(&self) -> Result<Vec<StrainDetail>, PosError> {
        self.get_json("/products/strains", &[]).await
    }

    /// Attach an image to a product in the POS catalog.
    pub async fn set_image(&self, req: &SetImageRequest) -> Result<SetImageResponse, PosError> {
        tracing::debug!(
            product_id = req.product_id,
            file_name = %req.file_name,
            "Setting product image via POS"
        );
        self.post_json("/products/set-image", req).await
    }

    /// Remove an image from a product in the POS catalog.
    pub async fn remove_image(&self, req: &DeleteImageRequest) -> Result<SuccessResult, PosError> {
        self.post_json("/products/remove-image", req).await
    }

    /// Update ONLY a product's online description.
    ///
    /// The vendor's product update endpoint nulls every omitted field,
    /// including compliance-critical data (THC/CBD content, regulatory
    /// category). This sends the product identity plus the new description
    /// and nothing else; no other field may ever be written through this
    /// call.
    pub async fn update_online_description(
        &self,
        product_id: i64,
        online_description: &str,
    ) -> Result<ProductDetail, PosError> {
        let products = self
            .get_products(&ProductQuery {
                is_active: Some(true),
                ..Default::default()
            })
            .await?;
        let product = products
            .into_iter()
            .find(|p| p.product_id == product_id)
            .ok_or(PosError::ProductNotFound(product_id))?;

        let body = json!({
            "productId": product.product_id,
            "sku": product.sku,
            "productName": product.product_name,
            "onlineDescription": online_description,
        });

        self.post_json("/products/product", &body).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PosError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| PosError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PosError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await
            .map_err(|e| PosError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PosError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PosError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| PosError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ProductImageSink for PosClient {
    async fn push_image(&self, req: &SetImageRequest) -> Result<SetImageResponse, PosError> {
        self.set_image(req).await
    }
}
