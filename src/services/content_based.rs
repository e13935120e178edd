use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::Recommender;
use crate::models::{clamp_score, Algorithm, CatalogItem, RecommendationResult, UserProfile};
use crate::stores::{CatalogFilter, CatalogStore};

const BASE_SCORE: f64 = 0.5;
const TAG_WEIGHT: f64 = 0.3;
const PERFORMER_WEIGHT: f64 = 0.3;
const RATING_WEIGHT: f64 = 0.1;
const RATING_BASELINE: f64 = 3.0;

const DEFAULT_REASON: &str = "Matches your viewing preferences";
const REASON_JOINER: &str = " and ";

/// Content-based scoring over the user's stated preferences
///
/// Candidates come from the catalog's any-of filter (preferred tags,
/// performers, categories, narrowed by rating and duration bounds); the
/// score rewards the fraction of stated preferences the item satisfies.
pub struct ContentRecommender {
    catalog: Arc<dyn CatalogStore>,
}

impl ContentRecommender {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    fn filter_for(profile: &UserProfile) -> CatalogFilter {
        CatalogFilter {
            any_tags: profile.preferred_tags.clone(),
            any_performers: profile.preferred_performers.clone(),
            any_categories: profile.preferred_categories.clone(),
            min_rating: (profile.min_rating > 0.0).then_some(profile.min_rating),
            min_duration_seconds: profile.min_duration_seconds,
            max_duration_seconds: profile.max_duration_seconds,
        }
    }

    fn matched_tag_count(profile: &UserProfile, item: &CatalogItem) -> usize {
        item.tags
            .iter()
            .filter(|t| profile.preferred_tags.contains(t))
            .count()
    }

    fn matched_performer_count(profile: &UserProfile, item: &CatalogItem) -> usize {
        item.performers
            .iter()
            .filter(|p| profile.preferred_performers.contains(p))
            .count()
    }

    /// 0.5 base, plus the satisfied fraction of preferred tags and
    /// performers, plus a bonus for ratings above 3; clamped to [0, 1]
    ///
    /// The performer fraction deliberately divides by the profile's
    /// preferred-performer count, not the item's performer count, pending
    /// product clarification.
    pub fn score_item(profile: &UserProfile, item: &CatalogItem) -> f64 {
        let mut score = BASE_SCORE;

        if !profile.preferred_tags.is_empty() {
            let matched = Self::matched_tag_count(profile, item);
            score += matched as f64 / profile.preferred_tags.len() as f64 * TAG_WEIGHT;
        }

        if !profile.preferred_performers.is_empty() {
            let matched = Self::matched_performer_count(profile, item);
            score +=
                matched as f64 / profile.preferred_performers.len() as f64 * PERFORMER_WEIGHT;
        }

        if item.rating > RATING_BASELINE {
            score += (item.rating - RATING_BASELINE) * RATING_WEIGHT;
        }

        clamp_score(score)
    }

    /// Assembles the reason from an ordered list of (matched, template)
    /// facet pairs so generation is deterministic
    pub fn build_reason(profile: &UserProfile, item: &CatalogItem) -> String {
        let facets = [
            (
                Self::matched_tag_count(profile, item) > 0,
                "matches your preferred tags",
            ),
            (
                Self::matched_performer_count(profile, item) > 0,
                "features your favorite performers",
            ),
            (item.rating > RATING_BASELINE, "highly rated content"),
        ];

        let matched: Vec<&str> = facets
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, template)| *template)
            .collect();

        if matched.is_empty() {
            DEFAULT_REASON.to_string()
        } else {
            matched.join(REASON_JOINER)
        }
    }

    fn is_blocked(profile: &UserProfile, item: &CatalogItem) -> bool {
        item.has_any_tag(&profile.blocked_tags)
            || item.has_any_performer(&profile.blocked_performers)
    }
}

#[async_trait]
impl Recommender for ContentRecommender {
    async fn generate(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        limit: usize,
    ) -> Vec<RecommendationResult> {
        let candidates = match self.catalog.filter_any_of(Self::filter_for(profile)).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Content recall failed, returning empty");
                return Vec::new();
            }
        };

        let mut survivors: Vec<CatalogItem> = candidates
            .into_iter()
            .filter(|item| !Self::is_blocked(profile, item))
            .collect();

        survivors.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.view_count.cmp(&a.view_count))
        });
        survivors.truncate(limit);

        tracing::debug!(
            user_id = %user_id,
            count = survivors.len(),
            "Content recommendations generated"
        );

        survivors
            .into_iter()
            .map(|item| {
                let score = Self::score_item(profile, &item);
                let reason = Self::build_reason(profile, &item);
                RecommendationResult {
                    item,
                    score,
                    reason,
                    algorithm: Algorithm::ContentBased,
                }
            })
            .collect()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::ContentBased
    }
}
