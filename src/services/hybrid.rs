use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use super::Recommender;
use crate::models::{clamp_score, Algorithm, CatalogItem, RecommendationResult, UserProfile};

const COLLABORATIVE_WEIGHT: f64 = 0.4;
const CONTENT_WEIGHT: f64 = 0.4;
const TRENDING_WEIGHT: f64 = 0.2;
const REASON_SEPARATOR: &str = " & ";

/// One strategy feeding the blend; its weight doubles as the share of the
/// candidate pool requested from it
struct BlendSource {
    recommender: Arc<dyn Recommender>,
    weight: f64,
}

/// Accumulator for one item across sources
struct BlendAccumulator {
    item: CatalogItem,
    score_sum: f64,
    reasons: Vec<String>,
    sources: HashSet<Algorithm>,
}

/// Weighted merge of the three scoring strategies
///
/// The three sub-queries are independent, read-only and order-insensitive,
/// so they run concurrently; the merge is a commutative fold, so no
/// ordering between branches matters for the combined scores.
pub struct HybridBlender {
    sources: Vec<BlendSource>,
}

impl HybridBlender {
    pub fn new(
        collaborative: Arc<dyn Recommender>,
        content: Arc<dyn Recommender>,
        trending: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            sources: vec![
                BlendSource {
                    recommender: collaborative,
                    weight: COLLABORATIVE_WEIGHT,
                },
                BlendSource {
                    recommender: content,
                    weight: CONTENT_WEIGHT,
                },
                BlendSource {
                    recommender: trending,
                    weight: TRENDING_WEIGHT,
                },
            ],
        }
    }

    /// Generates a blended ranking of at most `limit` items
    ///
    /// Each source is asked for its weighted share of an overfetched
    /// candidate pool (`limit * overfetch_factor`).
    pub async fn generate(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        limit: usize,
        overfetch_factor: f64,
    ) -> Vec<RecommendationResult> {
        let pool = (limit as f64 * overfetch_factor).ceil();

        let fan_out = self.sources.iter().map(|source| {
            let quota = ((pool * source.weight).ceil() as usize).max(1);
            async move {
                (
                    source.weight,
                    source.recommender.generate(user_id, profile, quota).await,
                )
            }
        });
        let source_lists = join_all(fan_out).await;

        let mut merged = blend(source_lists);
        merged.truncate(limit);

        tracing::debug!(
            user_id = %user_id,
            count = merged.len(),
            "Hybrid recommendations blended"
        );

        merged
    }
}

/// Folds weighted source lists into one ranked list
///
/// Each source contributes `score * weight` per item; contributions sum
/// across sources, reasons concatenate (distinct only), and an item backed
/// by more than one source is relabeled as hybrid. Pure with respect to
/// input order of the sources.
fn blend(source_lists: Vec<(f64, Vec<RecommendationResult>)>) -> Vec<RecommendationResult> {
    let mut accumulators: HashMap<Uuid, BlendAccumulator> = HashMap::new();

    for (weight, results) in source_lists {
        for result in results {
            let entry = accumulators
                .entry(result.item.id)
                .or_insert_with(|| BlendAccumulator {
                    item: result.item,
                    score_sum: 0.0,
                    reasons: Vec::new(),
                    sources: HashSet::new(),
                });
            entry.score_sum += result.score * weight;
            if !entry.reasons.contains(&result.reason) {
                entry.reasons.push(result.reason);
            }
            entry.sources.insert(result.algorithm);
        }
    }

    let mut merged: Vec<RecommendationResult> = accumulators
        .into_values()
        .map(|acc| {
            let algorithm = if acc.sources.len() > 1 {
                Algorithm::Hybrid
            } else {
                acc.sources
                    .into_iter()
                    .next()
                    .unwrap_or(Algorithm::Hybrid)
            };
            RecommendationResult {
                item: acc.item,
                score: clamp_score(acc.score_sum),
                reason: acc.reasons.join(REASON_SEPARATOR),
                algorithm,
            }
        })
        .collect();

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
    merged
}
