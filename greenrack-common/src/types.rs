//! Wire types for the external POS platform API
//!
//! Field names mirror the vendor's JSON (camelCase). `ProductDetail` is the
//! vendor's full product record; most fields are nullable and passed through
//! untouched to dashboard consumers.

use serde::{Deserialize, Serialize};

/// Product record as returned by the POS products endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product_id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub online_description: Option<String>,
    #[serde(default)]
    pub master_category: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub strain_id: Option<i64>,
    #[serde(default)]
    pub strain: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<i64>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub is_cannabis: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub thc_content: Option<f64>,
    #[serde(default)]
    pub thc_content_unit: Option<String>,
    #[serde(default)]
    pub cbd_content: Option<f64>,
    #[serde(default)]
    pub cbd_content_unit: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default, rename = "lastModifiedDateUTC")]
    pub last_modified_date_utc: Option<String>,
}

/// Category record from the POS product-category endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub product_category_id: i64,
    #[serde(default)]
    pub product_category_name: Option<String>,
    #[serde(default)]
    pub master_category: Option<String>,
}

/// Strain record from the POS strains endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrainDetail {
    pub strain_id: i64,
    #[serde(default)]
    pub strain_name: Option<String>,
    #[serde(default)]
    pub strain_description: Option<String>,
    #[serde(default)]
    pub strain_abbreviation: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
}

/// Payload for the POS set-image operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetImageRequest {
    pub product_id: i64,
    pub base64_image: String,
    pub file_name: String,
}

/// Result of the POS set-image operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetImageResponse {
    pub image_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Payload for the POS remove-image operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub product_id: i64,
    pub image_id: i64,
}

/// Generic success/failure envelope some POS operations return
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResult {
    pub result: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
