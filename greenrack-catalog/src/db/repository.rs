//! Image repository and matching-rule storage
//!
//! Owns the `repository_images` and `matching_rules` tables. Deletes are
//! idempotent by contract: removing an absent row succeeds as a no-op.
//! Rules are immutable once created.

use crate::models::{CandidateRule, MatchingRule, NewImage, NewRule, RepositoryImage};
use chrono::NaiveDateTime;
use greenrack_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

/// MIME types accepted for repository images
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Upper bound on stored image size
pub const MAX_IMAGE_SIZE_BYTES: usize = 10 * 1024 * 1024;

type ImageRow = (i64, String, String, String, Option<String>, NaiveDateTime);
type RuleRow = (
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    NaiveDateTime,
);

/// Storage facade over the repository tables
#[derive(Clone)]
pub struct RepositoryStore {
    db: SqlitePool,
}

impl RepositoryStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// List all images with their rules nested.
    ///
    /// Images are ordered by group (ungrouped last) then newest first;
    /// rules within an image by descending priority, then id.
    pub async fn list_images(&self) -> Result<Vec<RepositoryImage>> {
        let image_rows: Vec<ImageRow> = sqlx::query_as(
            r#"
            SELECT id, name, file_name, mime_type, group_name, created_at
            FROM repository_images
            ORDER BY group_name IS NULL, group_name, created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let rule_rows: Vec<RuleRow> = sqlx::query_as(
            r#"
            SELECT id, image_id, brand_name, category, strain, strain_type,
                   product_name_keywords, priority, created_at
            FROM matching_rules
            ORDER BY priority DESC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut rules_by_image: HashMap<i64, Vec<MatchingRule>> = HashMap::new();
        for row in rule_rows {
            let rule = rule_from_row(row)?;
            rules_by_image.entry(rule.image_id).or_default().push(rule);
        }

        Ok(image_rows
            .into_iter()
            .map(|(id, name, file_name, mime_type, group_name, created_at)| {
                let rules = rules_by_image.remove(&id).unwrap_or_default();
                RepositoryImage {
                    id,
                    name,
                    file_name,
                    mime_type,
                    group_name,
                    created_at,
                    rules_count: rules.len() as i64,
                    rules,
                }
            })
            .collect())
    }

    /// Store a new image. All of name, file name, MIME type, and bytes are
    /// required; the MIME type must be a supported image format.
    pub async fn create_image(&self, image: NewImage) -> Result<RepositoryImage> {
        if image.name.is_empty() {
            return Err(Error::InvalidInput("image name is required".to_string()));
        }
        if image.file_name.is_empty() {
            return Err(Error::InvalidInput("file name is required".to_string()));
        }
        if image.mime_type.is_empty() {
            return Err(Error::InvalidInput("MIME type is required".to_string()));
        }
        if image.image_data.is_empty() {
            return Err(Error::InvalidInput("image data is required".to_string()));
        }
        if !SUPPORTED_IMAGE_TYPES.contains(&image.mime_type.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Unsupported file type: {}. Use JPG, PNG, or WebP.",
                image.mime_type
            )));
        }
        if image.image_data.len() > MAX_IMAGE_SIZE_BYTES {
            return Err(Error::InvalidInput(format!(
                "File too large: {:.1}MB. Max is {}MB.",
                image.image_data.len() as f64 / 1024.0 / 1024.0,
                MAX_IMAGE_SIZE_BYTES / 1024 / 1024
            )));
        }

        let group_name = normalize(image.group_name);
        let result = sqlx::query(
            r#"
            INSERT INTO repository_images (name, file_name, mime_type, image_data, group_name)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&image.name)
        .bind(&image.file_name)
        .bind(&image.mime_type)
        .bind(&image.image_data)
        .bind(&group_name)
        .execute(&self.db)
        .await?;

        let id = result.last_insert_rowid();
        debug!(image_id = id, name = %image.name, "Created repository image");

        let (created_at,): (NaiveDateTime,) =
            sqlx::query_as("SELECT created_at FROM repository_images WHERE id = ?")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(RepositoryImage {
            id,
            name: image.name,
            file_name: image.file_name,
            mime_type: image.mime_type,
            group_name,
            created_at,
            rules_count: 0,
            rules: Vec::new(),
        })
    }

    /// Delete an image and (via FK cascade) all rules referencing it.
    /// Deleting a nonexistent id is a successful no-op.
    pub async fn delete_image(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM repository_images WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        debug!(
            image_id = id,
            rows = result.rows_affected(),
            "Deleted repository image"
        );
        Ok(())
    }

    /// Fetch stored bytes plus file name and MIME type for one image.
    pub async fn image_data(&self, id: i64) -> Result<Option<(Vec<u8>, String, String)>> {
        let row: Option<(Vec<u8>, String, String)> = sqlx::query_as(
            "SELECT image_data, file_name, mime_type FROM repository_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    /// Create a rule referencing an existing image.
    ///
    /// Empty-string filters and empty keyword lists are normalized to NULL.
    /// When no explicit priority is given, it defaults to the number of
    /// filter criteria set, the keyword list counting as one.
    pub async fn create_rule(&self, rule: NewRule) -> Result<MatchingRule> {
        if rule.image_id <= 0 {
            return Err(Error::InvalidInput("imageId is required".to_string()));
        }

        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM repository_images WHERE id = ?")
                .bind(rule.image_id)
                .fetch_optional(&self.db)
                .await?;
        if exists.is_none() {
            return Err(Error::NotFound(format!(
                "Repository image {} not found",
                rule.image_id
            )));
        }

        let brand_name = normalize(rule.brand_name);
        let category = normalize(rule.category);
        let strain = normalize(rule.strain);
        let strain_type = normalize(rule.strain_type);
        let keywords = rule
            .product_name_keywords
            .filter(|kw| !kw.is_empty())
            .map(|kw| {
                kw.into_iter()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|kw| !kw.is_empty());

        let priority = rule.priority.unwrap_or_else(|| {
            let filters = [&brand_name, &category, &strain, &strain_type]
                .iter()
                .filter(|f| f.is_some())
                .count() as i64;
            filters + i64::from(keywords.is_some())
        });

        let keywords_json = keywords
            .as_ref()
            .map(|kw| serde_json::to_string(kw))
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to encode keywords: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO matching_rules
                (image_id, brand_name, category, strain, strain_type, product_name_keywords, priority)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rule.image_id)
        .bind(&brand_name)
        .bind(&category)
        .bind(&strain)
        .bind(&strain_type)
        .bind(&keywords_json)
        .bind(priority)
        .execute(&self.db)
        .await?;

        let id = result.last_insert_rowid();
        debug!(rule_id = id, image_id = rule.image_id, priority, "Created matching rule");

        let (created_at,): (NaiveDateTime,) =
            sqlx::query_as("SELECT created_at FROM matching_rules WHERE id = ?")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(MatchingRule {
            id,
            image_id: rule.image_id,
            brand_name,
            category,
            strain,
            strain_type,
            product_name_keywords: keywords,
            priority,
            created_at,
        })
    }

    /// Delete a rule. Deleting a nonexistent id is a successful no-op.
    pub async fn delete_rule(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM matching_rules WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        debug!(rule_id = id, rows = result.rows_affected(), "Deleted matching rule");
        Ok(())
    }

    /// Snapshot of all rules joined with their image name, in evaluation
    /// order: priority descending, then rule id ascending.
    pub async fn all_rules(&self) -> Result<Vec<CandidateRule>> {
        let rows: Vec<(
            i64,
            i64,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            i64,
            NaiveDateTime,
        )> = sqlx::query_as(
            r#"
            SELECT r.id, r.image_id, ri.name, r.brand_name, r.category, r.strain,
                   r.strain_type, r.product_name_keywords, r.priority, r.created_at
            FROM matching_rules r
            JOIN repository_images ri ON ri.id = r.image_id
            ORDER BY r.priority DESC, r.id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(
                |(id, image_id, image_name, brand_name, category, strain, strain_type, kw, priority, created_at)| {
                    Ok(CandidateRule {
                        rule: rule_from_row((
                            id, image_id, brand_name, category, strain, strain_type, kw,
                            priority, created_at,
                        ))?,
                        image_name,
                    })
                },
            )
            .collect()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn rule_from_row(row: RuleRow) -> Result<MatchingRule> {
    let (id, image_id, brand_name, category, strain, strain_type, keywords_json, priority, created_at) =
        row;
    let product_name_keywords = keywords_json
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| Error::Internal(format!("Invalid keyword list in database: {}", e)))?;

    Ok(MatchingRule {
        id,
        image_id,
        brand_name,
        category,
        strain,
        strain_type,
        product_name_keywords,
        priority,
        created_at,
    })
}
