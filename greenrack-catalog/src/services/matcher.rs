//! Rule matching for repository images
//!
//! For a batch of products, finds the single best-matching repository image
//! for each product independently. One rule snapshot is taken per batch, so
//! rules created mid-flight may or may not be visible; each product is then
//! evaluated against the same immutable set.
//!
//! A rule matches when every non-null filter field equals the product's
//! corresponding field (case-sensitive), and, if a keyword list is present,
//! every keyword occurs in the product name (case-insensitive substring).
//! The highest-priority matching rule wins; equal priorities are broken by
//! lowest rule id.

use crate::db::RepositoryStore;
use crate::models::{CandidateRule, MatchResult, ProductInput};
use greenrack_common::Result;

pub struct RuleMatcher {
    store: RepositoryStore,
}

impl RuleMatcher {
    pub fn new(store: RepositoryStore) -> Self {
        Self { store }
    }

    /// Match a batch of products against the current rule set.
    ///
    /// Returns one result per input product, in input order.
    pub async fn match_products(&self, products: &[ProductInput]) -> Result<Vec<MatchResult>> {
        let rules = self.store.all_rules().await?;
        tracing::debug!(
            products = products.len(),
            rules = rules.len(),
            "Matching products against rule set"
        );

        Ok(products
            .iter()
            .map(|product| Self::best_match(&rules, product))
            .collect())
    }

    /// Pick the winning rule for one product. `rules` must already be in
    /// evaluation order (priority descending, id ascending), so the first
    /// match is the winner.
    fn best_match(rules: &[CandidateRule], product: &ProductInput) -> MatchResult {
        match rules.iter().find(|c| Self::rule_matches(c, product)) {
            Some(candidate) => MatchResult {
                product_id: product.product_id,
                product_name: product.product_name.clone(),
                matched_image_id: Some(candidate.rule.image_id),
                matched_image_name: Some(candidate.image_name.clone()),
                matched_rule_id: Some(candidate.rule.id),
            },
            None => MatchResult::no_match(product),
        }
    }

    fn rule_matches(candidate: &CandidateRule, product: &ProductInput) -> bool {
        let rule = &candidate.rule;

        if !field_matches(&rule.brand_name, &product.brand_name)
            || !field_matches(&rule.category, &product.category)
            || !field_matches(&rule.strain, &product.strain)
            || !field_matches(&rule.strain_type, &product.strain_type)
        {
            return false;
        }

        if let Some(keywords) = &rule.product_name_keywords {
            if !keywords.is_empty() {
                let name = product
                    .product_name
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase();
                if !keywords.iter().all(|kw| name.contains(&kw.to_lowercase())) {
                    return false;
                }
            }
        }

        true
    }
}

/// A null filter is a wildcard; a set filter requires exact equality.
fn field_matches(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        None => true,
        Some(f) => value.as_deref() == Some(f.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{NewImage, NewRule};

    async fn setup() -> (RepositoryStore, RuleMatcher) {
        let pool = db::connect_in_memory().await.unwrap();
        db::init_schema(&pool).await.unwrap();
        let store = RepositoryStore::new(pool);
        (store.clone(), RuleMatcher::new(store))
    }

    async fn add_image(store: &RepositoryStore, name: &str) -> i64 {
        store
            .create_image(NewImage {
                name: name.to_string(),
                file_name: format!("{}.png", name),
                mime_type: "image/png".to_string(),
                image_data: vec![1, 2, 3],
                group_name: None,
            })
            .await
            .unwrap()
            .id
    }

    fn product(name: &str, brand: Option<&str>) -> ProductInput {
        ProductInput {
            product_id: 1,
            product_name: Some(name.to_string()),
            brand_name: brand.map(str::to_string),
            category: None,
            strain: None,
            strain_type: None,
        }
    }

    #[tokio::test]
    async fn test_one_result_per_product_in_input_order() {
        let (_store, matcher) = setup().await;

        let products = vec![
            ProductInput {
                product_id: 11,
                ..product("A", None)
            },
            ProductInput {
                product_id: 22,
                ..product("B", None)
            },
        ];
        let results = matcher.match_products(&products).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].product_id, 11);
        assert_eq!(results[1].product_id, 22);
    }

    #[tokio::test]
    async fn test_no_rules_means_no_match() {
        let (_store, matcher) = setup().await;
        let results = matcher
            .match_products(&[product("Anything", Some("Acme"))])
            .await
            .unwrap();
        assert_eq!(results[0].matched_image_id, None);
        assert_eq!(results[0].matched_image_name, None);
        assert_eq!(results[0].matched_rule_id, None);
    }

    #[tokio::test]
    async fn test_catch_all_rule_matches_everything() {
        let (store, matcher) = setup().await;
        let image_id = add_image(&store, "fallback").await;
        store
            .create_rule(NewRule {
                image_id,
                ..Default::default()
            })
            .await
            .unwrap();

        let results = matcher
            .match_products(&[product("Some Product", Some("Any Brand"))])
            .await
            .unwrap();
        assert_eq!(results[0].matched_image_id, Some(image_id));
        assert_eq!(results[0].matched_image_name.as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn test_brand_filter_is_exact_and_case_sensitive() {
        let (store, matcher) = setup().await;
        let image_id = add_image(&store, "branded").await;
        store
            .create_rule(NewRule {
                image_id,
                brand_name: Some("Acme".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let hit = matcher
            .match_products(&[product("X", Some("Acme"))])
            .await
            .unwrap();
        assert_eq!(hit[0].matched_image_id, Some(image_id));

        let miss = matcher
            .match_products(&[product("X", Some("acme"))])
            .await
            .unwrap();
        assert_eq!(miss[0].matched_image_id, None);

        let null_brand = matcher.match_products(&[product("X", None)]).await.unwrap();
        assert_eq!(null_brand[0].matched_image_id, None);
    }

    #[tokio::test]
    async fn test_higher_priority_rule_wins() {
        let (store, matcher) = setup().await;
        let general = add_image(&store, "general").await;
        let specific = add_image(&store, "specific").await;

        store
            .create_rule(NewRule {
                image_id: general,
                ..Default::default()
            })
            .await
            .unwrap();
        let winner = store
            .create_rule(NewRule {
                image_id: specific,
                brand_name: Some("Acme".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let results = matcher
            .match_products(&[product("X", Some("Acme"))])
            .await
            .unwrap();
        assert_eq!(results[0].matched_image_id, Some(specific));
        assert_eq!(results[0].matched_rule_id, Some(winner.id));
    }

    #[tokio::test]
    async fn test_equal_priority_breaks_tie_by_lowest_rule_id() {
        let (store, matcher) = setup().await;
        let first = add_image(&store, "first").await;
        let second = add_image(&store, "second").await;

        let first_rule = store
            .create_rule(NewRule {
                image_id: first,
                priority: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_rule(NewRule {
                image_id: second,
                priority: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        let results = matcher.match_products(&[product("X", None)]).await.unwrap();
        assert_eq!(results[0].matched_rule_id, Some(first_rule.id));
        assert_eq!(results[0].matched_image_id, Some(first));
    }

    #[tokio::test]
    async fn test_keywords_all_required_case_insensitive() {
        let (store, matcher) = setup().await;
        let image_id = add_image(&store, "lookah-pro").await;
        store
            .create_rule(NewRule {
                image_id,
                product_name_keywords: Some(vec!["pro".to_string(), "cat".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        let hit = matcher
            .match_products(&[product("Lookah Pro Cat Vape", None)])
            .await
            .unwrap();
        assert_eq!(hit[0].matched_image_id, Some(image_id));

        // "pro" is missing from the name
        let miss = matcher
            .match_products(&[product("Lookah Cat Vape", None)])
            .await
            .unwrap();
        assert_eq!(miss[0].matched_image_id, None);
    }

    #[tokio::test]
    async fn test_keyword_rule_never_matches_missing_name() {
        let (store, matcher) = setup().await;
        let image_id = add_image(&store, "named").await;
        store
            .create_rule(NewRule {
                image_id,
                product_name_keywords: Some(vec!["vape".to_string()]),
                ..Default::default()
            })
            .await
            .unwrap();

        let nameless = ProductInput {
            product_id: 1,
            product_name: None,
            brand_name: None,
            category: None,
            strain: None,
            strain_type: None,
        };
        let results = matcher.match_products(&[nameless]).await.unwrap();
        assert_eq!(results[0].matched_image_id, None);
    }

    #[tokio::test]
    async fn test_all_filters_must_hold_together() {
        let (store, matcher) = setup().await;
        let image_id = add_image(&store, "combo").await;
        store
            .create_rule(NewRule {
                image_id,
                brand_name: Some("Acme".to_string()),
                category: Some("Edibles".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut p = product("Gummies", Some("Acme"));
        p.category = Some("Edibles".to_string());
        let hit = matcher.match_products(std::slice::from_ref(&p)).await.unwrap();
        assert_eq!(hit[0].matched_image_id, Some(image_id));

        p.category = Some("Flower".to_string());
        let miss = matcher.match_products(&[p]).await.unwrap();
        assert_eq!(miss[0].matched_image_id, None);
    }
}
