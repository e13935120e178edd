use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use super::FeatureExtractor;
use crate::error::{EngineError, EngineResult};
use crate::models::{clamp_score, FeatureProfile, SimilarityResult};
use crate::stores::CatalogStore;

const CATEGORY_WEIGHT: f64 = 0.30;
const TAG_WEIGHT: f64 = 0.25;
const THEME_WEIGHT: f64 = 0.20;
const VISUAL_STYLE_WEIGHT: f64 = 0.15;
const CONTENT_TYPE_WEIGHT: f64 = 0.10;

const MAX_MATCHED_FEATURES: usize = 5;

/// Pairwise similarity scoring and "find similar" ranking
///
/// Scores are directional: every overlap ratio divides by the size of the
/// target's feature set, so A-to-B and B-to-A generally differ.
pub struct SimilarityEngine {
    catalog: Arc<dyn CatalogStore>,
    extractor: FeatureExtractor,
    threshold: f64,
}

impl SimilarityEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, extractor: FeatureExtractor, threshold: f64) -> Self {
        Self {
            catalog,
            extractor,
            threshold,
        }
    }

    /// Ranks catalog items by similarity to the target
    ///
    /// Never returns the target itself, never duplicates an id, and keeps
    /// only candidates scoring above the threshold.
    pub async fn find_similar(
        &self,
        target_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<SimilarityResult>> {
        let target = self
            .catalog
            .get(target_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Item {} not found", target_id)))?;

        let target_features = self.extractor.analyze(&target).await;

        let candidates = match self.catalog.list_all().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(target_id = %target_id, error = %e, "Catalog scan failed, no similar items");
                return Ok(Vec::new());
            }
        };

        let mut seen: HashSet<Uuid> = HashSet::new();
        seen.insert(target_id);

        let mut results = Vec::new();
        for candidate in candidates {
            if !seen.insert(candidate.id) {
                continue;
            }

            let candidate_features = self.extractor.analyze(&candidate).await;
            let (score, matched) = score_pair(&target_features, &candidate_features);
            if score > self.threshold {
                results.push(SimilarityResult {
                    reason: tiered_reason(score, &matched),
                    item: candidate,
                    score,
                    matched_features: matched,
                });
            }
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        results.truncate(limit);

        tracing::debug!(target_id = %target_id, count = results.len(), "Similar items ranked");

        Ok(results)
    }

    /// Extracts feature profiles for many items in bounded chunks
    pub async fn batch_analyze(&self, item_ids: &[Uuid]) -> usize {
        self.extractor.batch_analyze(item_ids).await
    }
}

/// Directional overlap ratio: shared labels over the target set's size
fn overlap(target: &[String], candidate: &[String]) -> (f64, Vec<String>) {
    let candidate_set: HashSet<&str> = candidate.iter().map(|s| s.as_str()).collect();
    let matched: Vec<String> = target
        .iter()
        .filter(|label| candidate_set.contains(label.as_str()))
        .cloned()
        .collect();
    let ratio = matched.len() as f64 / target.len().max(1) as f64;
    (ratio, matched)
}

/// Weighted similarity of a candidate to the target, with the matched
/// feature labels (at most five, strongest facets first)
pub fn score_pair(target: &FeatureProfile, candidate: &FeatureProfile) -> (f64, Vec<String>) {
    let (category_ratio, category_matches) = overlap(&target.categories, &candidate.categories);
    let (tag_ratio, tag_matches) = overlap(&target.tags, &candidate.tags);
    let (theme_ratio, theme_matches) = overlap(&target.themes, &candidate.themes);
    let (visual_ratio, visual_matches) = overlap(&target.visual_style, &candidate.visual_style);
    let content_type_match = target.content_type == candidate.content_type;

    let score = category_ratio * CATEGORY_WEIGHT
        + tag_ratio * TAG_WEIGHT
        + theme_ratio * THEME_WEIGHT
        + visual_ratio * VISUAL_STYLE_WEIGHT
        + if content_type_match {
            CONTENT_TYPE_WEIGHT
        } else {
            0.0
        };

    let mut matched = Vec::new();
    let mut seen = HashSet::new();
    for label in category_matches
        .into_iter()
        .chain(tag_matches)
        .chain(theme_matches)
        .chain(visual_matches)
    {
        if seen.insert(label.clone()) {
            matched.push(label);
        }
        if matched.len() == MAX_MATCHED_FEATURES {
            break;
        }
    }

    (clamp_score(score), matched)
}

/// Tiered human-readable reason for a match
fn tiered_reason(score: f64, matched: &[String]) -> String {
    if score > 0.8 {
        "Highly similar content and style".to_string()
    } else if score >= 0.6 && !matched.is_empty() {
        format!("Similar {}", matched.join(", "))
    } else if score >= 0.4 && !matched.is_empty() {
        format!("Shares {}", matched[0])
    } else {
        "Some matching features".to_string()
    }
}
