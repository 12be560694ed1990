//! Domain models for the image repository and rule matching

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Reusable image asset stored in the repository.
///
/// The raw bytes are deliberately not part of this model; they are fetched
/// separately by id when serving or applying the image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryImage {
    pub id: i64,
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub group_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub rules_count: i64,
    pub rules: Vec<MatchingRule>,
}

/// Matching rule tied to one repository image.
///
/// Each filter field is an exact-match condition, `None` meaning "any".
/// `product_name_keywords` requires every keyword to occur in the product
/// name (case-insensitive). Rules are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRule {
    pub id: i64,
    pub image_id: i64,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub strain: Option<String>,
    pub strain_type: Option<String>,
    pub product_name_keywords: Option<Vec<String>>,
    pub priority: i64,
    pub created_at: NaiveDateTime,
}

/// A rule joined with the name of its image, as consumed by the matcher
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRule {
    pub rule: MatchingRule,
    pub image_name: String,
}

/// Parameters for creating a repository image
#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: String,
    pub file_name: String,
    pub mime_type: String,
    pub image_data: Vec<u8>,
    pub group_name: Option<String>,
}

/// Parameters for creating a matching rule
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub image_id: i64,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub strain: Option<String>,
    pub strain_type: Option<String>,
    pub product_name_keywords: Option<Vec<String>>,
    /// Explicit priority; when `None` it defaults to the number of filter
    /// criteria set (keyword list counting as one)
    pub priority: Option<i64>,
}

/// Product attributes submitted for matching. Supplied by the caller,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub strain: Option<String>,
    #[serde(default)]
    pub strain_type: Option<String>,
}

/// Best-match outcome for one product. All matched fields are `None` when
/// no rule applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub product_id: i64,
    pub product_name: Option<String>,
    pub matched_image_id: Option<i64>,
    pub matched_image_name: Option<String>,
    pub matched_rule_id: Option<i64>,
}

impl MatchResult {
    /// Result for a product no rule matched
    pub fn no_match(product: &ProductInput) -> Self {
        Self {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            matched_image_id: None,
            matched_image_name: None,
            matched_rule_id: None,
        }
    }
}

/// One work item for the bulk-apply pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyItem {
    pub product_id: i64,
    pub image_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// One work item for the URL batch-upload pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    pub product_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub product_name: Option<String>,
}
