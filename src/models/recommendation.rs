use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use super::CatalogItem;

/// Scoring strategy that produced a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Collaborative,
    ContentBased,
    Trending,
    /// More than one strategy contributed to the blended score
    Hybrid,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Algorithm::Collaborative => "collaborative",
            Algorithm::ContentBased => "content_based",
            Algorithm::Trending => "trending",
            Algorithm::Hybrid => "hybrid",
        };
        write!(f, "{}", label)
    }
}

/// One ranked recommendation returned to the caller
///
/// Transient: regenerated per request; only the cache keeps a trace of the
/// previous generation, and that trace is replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub item: CatalogItem,
    /// Always within [0, 1]
    pub score: f64,
    pub reason: String,
    pub algorithm: Algorithm,
}

/// Cache-resident form of a recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedRecommendation {
    pub item_id: Uuid,
    pub score: f64,
    pub reason: String,
    pub algorithm: Algorithm,
    pub generated_at: DateTime<Utc>,
}

impl CachedRecommendation {
    pub fn from_result(result: &RecommendationResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            item_id: result.item.id,
            score: result.score,
            reason: result.reason.clone(),
            algorithm: result.algorithm,
            generated_at,
        }
    }
}

/// One ranked "find similar" match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResult {
    pub item: CatalogItem,
    /// Always within [0, 1]
    pub score: f64,
    /// Up to five labels shared with the target
    pub matched_features: Vec<String>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_display() {
        assert_eq!(Algorithm::Collaborative.to_string(), "collaborative");
        assert_eq!(Algorithm::ContentBased.to_string(), "content_based");
        assert_eq!(Algorithm::Trending.to_string(), "trending");
        assert_eq!(Algorithm::Hybrid.to_string(), "hybrid");
    }

    #[test]
    fn test_algorithm_serde_snake_case() {
        let json = serde_json::to_string(&Algorithm::ContentBased).unwrap();
        assert_eq!(json, "\"content_based\"");

        let parsed: Algorithm = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(parsed, Algorithm::Hybrid);
    }

    #[test]
    fn test_cached_recommendation_from_result() {
        let item = CatalogItem::new("Night Market");
        let result = RecommendationResult {
            item: item.clone(),
            score: 0.8,
            reason: "Users with similar tastes also enjoyed this".to_string(),
            algorithm: Algorithm::Collaborative,
        };

        let now = Utc::now();
        let cached = CachedRecommendation::from_result(&result, now);
        assert_eq!(cached.item_id, item.id);
        assert_eq!(cached.score, 0.8);
        assert_eq!(cached.algorithm, Algorithm::Collaborative);
        assert_eq!(cached.generated_at, now);
    }
}
