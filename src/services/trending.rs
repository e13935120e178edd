use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::Recommender;
use crate::models::{Algorithm, CatalogItem, RecommendationResult, UserProfile};
use crate::stores::{CatalogStore, InteractionStore, ItemViewStats};

const TRENDING_SCORE: f64 = 0.7;
const TRENDING_REASON: &str = "Trending content with recent popularity";

/// Recency-weighted popularity over a rolling window
///
/// Surfaces items with enough independent view events inside the trailing
/// window, ranked by recent view count and then by average recent rating.
pub struct TrendingRecommender {
    catalog: Arc<dyn CatalogStore>,
    interactions: Arc<dyn InteractionStore>,
    window_days: i64,
    min_views: u64,
}

impl TrendingRecommender {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        interactions: Arc<dyn InteractionStore>,
        window_days: i64,
        min_views: u64,
    ) -> Self {
        Self {
            catalog,
            interactions,
            window_days,
            min_views,
        }
    }
}

#[async_trait]
impl Recommender for TrendingRecommender {
    async fn generate(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        limit: usize,
    ) -> Vec<RecommendationResult> {
        let since = Utc::now() - Duration::days(self.window_days);

        let stats = match self.interactions.recent_view_stats(since).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Trending stats unavailable, returning empty");
                return Vec::new();
            }
        };

        let mut candidates: Vec<(CatalogItem, ItemViewStats)> = Vec::new();
        for stat in stats {
            if stat.view_count < self.min_views {
                continue;
            }
            match self.catalog.get(stat.item_id).await {
                Ok(Some(item)) if item.rating >= profile.min_rating => {
                    candidates.push((item, stat));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(item_id = %stat.item_id, error = %e, "Skipping unavailable item")
                }
            }
        }

        if candidates.is_empty() {
            tracing::debug!(user_id = %user_id, "Nothing trending inside the window");
            return Vec::new();
        }

        candidates.sort_by(|(_, a), (_, b)| {
            b.view_count.cmp(&a.view_count).then_with(|| {
                b.average_rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.average_rating.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        candidates.truncate(limit);

        candidates
            .into_iter()
            .map(|(item, _)| RecommendationResult {
                item,
                score: TRENDING_SCORE,
                reason: TRENDING_REASON.to_string(),
                algorithm: Algorithm::Trending,
            })
            .collect()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Trending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InteractionRecord;
    use crate::stores::memory::{InMemoryCatalogStore, InMemoryInteractionStore};
    use crate::stores::{MockInteractionStore, StoreError};
    use chrono::DateTime;

    fn item(rating: f64) -> CatalogItem {
        let mut item = CatalogItem::new("x");
        item.rating = rating;
        item
    }

    async fn add_views(
        interactions: &InMemoryInteractionStore,
        item_id: Uuid,
        count: usize,
        rating: Option<f64>,
        at: DateTime<Utc>,
    ) {
        for _ in 0..count {
            interactions
                .append(InteractionRecord {
                    user_id: Uuid::new_v4(),
                    item_id,
                    watch_duration_seconds: 300,
                    completion_percentage: 80.0,
                    rating,
                    recorded_at: at,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_requires_minimum_recent_views() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();
        let now = Utc::now();

        let hot = item(4.0);
        let cold = item(4.0);
        let stale = item(4.0);
        for i in [&hot, &cold, &stale] {
            catalog.insert(i.clone()).await;
        }

        add_views(&interactions, hot.id, 3, Some(4.0), now).await;
        add_views(&interactions, cold.id, 2, Some(5.0), now).await;
        // Plenty of views, all outside the window
        add_views(&interactions, stale.id, 8, Some(5.0), now - Duration::days(30)).await;

        let recommender = TrendingRecommender::new(
            Arc::new(catalog),
            Arc::new(interactions),
            7,
            3,
        );
        let profile = UserProfile::new(Uuid::new_v4());

        let results = recommender.generate(profile.user_id, &profile, 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, hot.id);
        assert_eq!(results[0].score, 0.7);
        assert_eq!(results[0].reason, "Trending content with recent popularity");
    }

    #[tokio::test]
    async fn test_orders_by_recent_views_then_recent_rating() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();
        let now = Utc::now();

        let most_viewed = item(3.0);
        let better_rated = item(3.0);
        let worse_rated = item(3.0);
        for i in [&most_viewed, &better_rated, &worse_rated] {
            catalog.insert(i.clone()).await;
        }

        add_views(&interactions, most_viewed.id, 5, Some(2.0), now).await;
        add_views(&interactions, better_rated.id, 3, Some(5.0), now).await;
        add_views(&interactions, worse_rated.id, 3, Some(3.0), now).await;

        let recommender = TrendingRecommender::new(
            Arc::new(catalog),
            Arc::new(interactions),
            7,
            3,
        );
        let profile = UserProfile::new(Uuid::new_v4());

        let results = recommender.generate(profile.user_id, &profile, 10).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].item.id, most_viewed.id);
        assert_eq!(results[1].item.id, better_rated.id);
        assert_eq!(results[2].item.id, worse_rated.id);
    }

    #[tokio::test]
    async fn test_respects_profile_minimum_rating() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();
        let now = Utc::now();

        let acceptable = item(4.0);
        let below_bar = item(2.0);
        catalog.insert(acceptable.clone()).await;
        catalog.insert(below_bar.clone()).await;

        add_views(&interactions, acceptable.id, 4, Some(4.0), now).await;
        add_views(&interactions, below_bar.id, 6, Some(4.0), now).await;

        let recommender = TrendingRecommender::new(
            Arc::new(catalog),
            Arc::new(interactions),
            7,
            3,
        );
        let mut profile = UserProfile::new(Uuid::new_v4());
        profile.min_rating = 3.5;

        let results = recommender.generate(profile.user_id, &profile, 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, acceptable.id);
    }

    #[tokio::test]
    async fn test_stats_failure_degrades_to_empty() {
        let mut interactions = MockInteractionStore::new();
        interactions
            .expect_recent_view_stats()
            .returning(|_| Err(StoreError::Backend("aggregates down".to_string())));

        let recommender = TrendingRecommender::new(
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(interactions),
            7,
            3,
        );
        let profile = UserProfile::new(Uuid::new_v4());

        let results = recommender.generate(profile.user_id, &profile, 10).await;
        assert!(results.is_empty());
    }
}
