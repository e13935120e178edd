use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ContentRecommender, Recommender};
use crate::models::{
    Algorithm, InteractionRecord, RecommendationResult, UserProfile,
};
use crate::stores::{CatalogStore, InteractionStore};

const MIN_SHARED_ITEMS: usize = 2;
const QUALIFYING_RATING: f64 = 3.0;
const QUALIFYING_COMPLETION: f64 = 70.0;
const NEIGHBOR_SCORE: f64 = 0.8;
const POPULARITY_SCORE: f64 = 0.6;

const NEIGHBOR_REASON: &str = "Users with similar tastes also enjoyed this";
const POPULARITY_REASON: &str = "Popular across the library";

/// A user whose watch history overlaps the target's
struct Neighbor {
    user_id: Uuid,
    shared_items: usize,
    /// Mean absolute rating difference over co-rated shared items;
    /// neighbors with no co-rated item rank last among equal overlaps
    avg_rating_diff: f64,
}

/// User-based collaborative filtering
///
/// Finds users sharing at least two watched items with the target, then
/// surfaces what those neighbors rated highly and finished. Falls back to
/// a content pass seeded from the user's own highly rated history, and
/// from there to global popularity.
pub struct CollaborativeRecommender {
    catalog: Arc<dyn CatalogStore>,
    interactions: Arc<dyn InteractionStore>,
    content: Arc<ContentRecommender>,
    neighbor_limit: usize,
}

impl CollaborativeRecommender {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        interactions: Arc<dyn InteractionStore>,
        content: Arc<ContentRecommender>,
        neighbor_limit: usize,
    ) -> Self {
        Self {
            catalog,
            interactions,
            content,
            neighbor_limit,
        }
    }

    /// Global popularity ranking: the strategy of last resort
    async fn popularity(&self, limit: usize) -> Vec<RecommendationResult> {
        let items = match self.catalog.top_by_popularity(limit).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Popularity fallback failed, returning empty");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .map(|item| RecommendationResult {
                item,
                score: POPULARITY_SCORE,
                reason: POPULARITY_REASON.to_string(),
                algorithm: Algorithm::Collaborative,
            })
            .collect()
    }

    /// Ranks other users by watch-history overlap with the target
    fn find_neighbors(
        &self,
        target_id: Uuid,
        target_ratings: &HashMap<Uuid, f64>,
        watched: &HashSet<Uuid>,
        all_records: &[InteractionRecord],
    ) -> Vec<Neighbor> {
        let mut by_user: HashMap<Uuid, Vec<&InteractionRecord>> = HashMap::new();
        for record in all_records {
            if record.user_id != target_id {
                by_user.entry(record.user_id).or_default().push(record);
            }
        }

        let mut neighbors: Vec<Neighbor> = by_user
            .into_iter()
            .filter_map(|(user_id, records)| {
                let mut shared: HashSet<Uuid> = HashSet::new();
                let mut diff_sum = 0.0;
                let mut diff_count = 0u32;

                for record in &records {
                    if !watched.contains(&record.item_id) {
                        continue;
                    }
                    shared.insert(record.item_id);
                    if let (Some(theirs), Some(mine)) =
                        (record.rating, target_ratings.get(&record.item_id))
                    {
                        diff_sum += (mine - theirs).abs();
                        diff_count += 1;
                    }
                }

                (shared.len() >= MIN_SHARED_ITEMS).then(|| Neighbor {
                    user_id,
                    shared_items: shared.len(),
                    avg_rating_diff: if diff_count > 0 {
                        diff_sum / diff_count as f64
                    } else {
                        f64::MAX
                    },
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.shared_items.cmp(&a.shared_items).then_with(|| {
                a.avg_rating_diff
                    .partial_cmp(&b.avg_rating_diff)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        neighbors.truncate(self.neighbor_limit);
        neighbors
    }

    /// Collects items the neighbors rated highly and mostly finished,
    /// ranked by average neighbor rating then occurrence count
    async fn from_neighbors(
        &self,
        neighbors: &[Neighbor],
        watched: &HashSet<Uuid>,
        all_records: &[InteractionRecord],
        limit: usize,
    ) -> Vec<RecommendationResult> {
        let neighbor_ids: HashSet<Uuid> = neighbors.iter().map(|n| n.user_id).collect();

        let mut grouped: HashMap<Uuid, (f64, usize)> = HashMap::new();
        for record in all_records {
            if !neighbor_ids.contains(&record.user_id) || watched.contains(&record.item_id) {
                continue;
            }
            let qualifies = record.rating.map(|r| r > QUALIFYING_RATING).unwrap_or(false)
                && record.completion_percentage > QUALIFYING_COMPLETION;
            if !qualifies {
                continue;
            }
            let entry = grouped.entry(record.item_id).or_insert((0.0, 0));
            entry.0 += record.rating.unwrap_or(0.0);
            entry.1 += 1;
        }

        let mut ranked: Vec<(Uuid, f64, usize)> = grouped
            .into_iter()
            .map(|(item_id, (rating_sum, count))| (item_id, rating_sum / count as f64, count))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.2.cmp(&a.2))
        });
        ranked.truncate(limit);

        let mut results = Vec::with_capacity(ranked.len());
        for (item_id, _, _) in ranked {
            match self.catalog.get(item_id).await {
                Ok(Some(item)) => results.push(RecommendationResult {
                    item,
                    score: NEIGHBOR_SCORE,
                    reason: NEIGHBOR_REASON.to_string(),
                    algorithm: Algorithm::Collaborative,
                }),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(item_id = %item_id, error = %e, "Skipping unavailable item")
                }
            }
        }
        results
    }

    /// Content pass seeded from the user's own highly rated history
    async fn seeded_content(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        history: &[InteractionRecord],
        limit: usize,
    ) -> Vec<RecommendationResult> {
        let liked: Vec<Uuid> = history
            .iter()
            .filter(|r| r.rating.map(|rating| rating > QUALIFYING_RATING).unwrap_or(false))
            .map(|r| r.item_id)
            .collect();

        if liked.is_empty() {
            tracing::debug!(user_id = %user_id, "No highly rated history, using popularity");
            return self.popularity(limit).await;
        }

        let mut seeded = UserProfile::new(user_id);
        seeded.blocked_tags = profile.blocked_tags.clone();
        seeded.blocked_performers = profile.blocked_performers.clone();
        for item_id in liked {
            if let Ok(Some(item)) = self.catalog.get(item_id).await {
                for tag in item.tags {
                    if !seeded.preferred_tags.contains(&tag) {
                        seeded.preferred_tags.push(tag);
                    }
                }
                for performer in item.performers {
                    if !seeded.preferred_performers.contains(&performer) {
                        seeded.preferred_performers.push(performer);
                    }
                }
                for category in item.categories {
                    if !seeded.preferred_categories.contains(&category) {
                        seeded.preferred_categories.push(category);
                    }
                }
            }
        }

        let mut results = self.content.generate(user_id, &seeded, limit).await;
        // The caller asked for the collaborative strategy; relabel
        for result in &mut results {
            result.algorithm = Algorithm::Collaborative;
        }
        results
    }
}

#[async_trait]
impl Recommender for CollaborativeRecommender {
    async fn generate(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        limit: usize,
    ) -> Vec<RecommendationResult> {
        let history = match self.interactions.find_by_user(user_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "History read failed, using popularity");
                return self.popularity(limit).await;
            }
        };

        if history.is_empty() {
            tracing::debug!(user_id = %user_id, "No interaction history, using popularity");
            return self.popularity(limit).await;
        }

        let all_records = match self.interactions.list_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Interaction scan failed, using popularity");
                return self.popularity(limit).await;
            }
        };

        let watched: HashSet<Uuid> = history.iter().map(|r| r.item_id).collect();
        let mut target_ratings: HashMap<Uuid, f64> = HashMap::new();
        for record in &history {
            if let Some(rating) = record.rating {
                target_ratings.insert(record.item_id, rating);
            }
        }

        let neighbors = self.find_neighbors(user_id, &target_ratings, &watched, &all_records);

        if neighbors.is_empty() {
            tracing::debug!(user_id = %user_id, "No qualifying neighbors, seeding from own history");
            return self.seeded_content(user_id, profile, &history, limit).await;
        }

        tracing::debug!(
            user_id = %user_id,
            neighbors = neighbors.len(),
            "Collaborative neighbors found"
        );

        self.from_neighbors(&neighbors, &watched, &all_records, limit)
            .await
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Collaborative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogItem;
    use crate::stores::memory::{InMemoryCatalogStore, InMemoryInteractionStore};
    use crate::stores::{MockInteractionStore, StoreError};
    use chrono::Utc;

    fn record(
        user_id: Uuid,
        item_id: Uuid,
        rating: Option<f64>,
        completion: f64,
    ) -> InteractionRecord {
        InteractionRecord {
            user_id,
            item_id,
            watch_duration_seconds: 600,
            completion_percentage: completion,
            rating,
            recorded_at: Utc::now(),
        }
    }

    fn item(view_count: u64, rating: f64) -> CatalogItem {
        let mut item = CatalogItem::new("x");
        item.view_count = view_count;
        item.rating = rating;
        item
    }

    async fn build(
        catalog: InMemoryCatalogStore,
        interactions: InMemoryInteractionStore,
    ) -> CollaborativeRecommender {
        let catalog: Arc<dyn CatalogStore> = Arc::new(catalog);
        let content = Arc::new(ContentRecommender::new(catalog.clone()));
        CollaborativeRecommender::new(catalog, Arc::new(interactions), content, 10)
    }

    #[tokio::test]
    async fn test_no_history_falls_back_to_popularity_ordering() {
        let catalog = InMemoryCatalogStore::new();
        let popular = item(50, 3.0);
        let niche = item(2, 5.0);
        catalog.insert(popular.clone()).await;
        catalog.insert(niche.clone()).await;

        let recommender = build(catalog, InMemoryInteractionStore::new()).await;
        let user = UserProfile::new(Uuid::new_v4());

        let results = recommender.generate(user.user_id, &user, 10).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item.id, popular.id);
        assert_eq!(results[1].item.id, niche.id);
        assert!(results.iter().all(|r| r.score == 0.6));
        assert!(results
            .iter()
            .all(|r| r.algorithm == Algorithm::Collaborative));
    }

    #[tokio::test]
    async fn test_neighbor_recommendations() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();

        let me = Uuid::new_v4();
        let neighbor = Uuid::new_v4();
        let shared_a = item(10, 4.0);
        let shared_b = item(10, 4.0);
        let suggestion = item(5, 4.5);

        for i in [&shared_a, &shared_b, &suggestion] {
            catalog.insert(i.clone()).await;
        }

        // Two shared items qualify the neighbor
        for item_id in [shared_a.id, shared_b.id] {
            interactions
                .append(record(me, item_id, Some(4.0), 95.0))
                .await
                .unwrap();
            interactions
                .append(record(neighbor, item_id, Some(4.0), 95.0))
                .await
                .unwrap();
        }
        // The neighbor loved something I haven't watched
        interactions
            .append(record(neighbor, suggestion.id, Some(4.5), 90.0))
            .await
            .unwrap();

        let recommender = build(catalog, interactions).await;
        let profile = UserProfile::new(me);

        let results = recommender.generate(me, &profile, 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, suggestion.id);
        assert_eq!(results[0].score, 0.8);
        assert_eq!(
            results[0].reason,
            "Users with similar tastes also enjoyed this"
        );
    }

    #[tokio::test]
    async fn test_neighbor_suggestions_exclude_low_rated_and_unfinished() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();

        let me = Uuid::new_v4();
        let neighbor = Uuid::new_v4();
        let shared_a = item(1, 3.0);
        let shared_b = item(1, 3.0);
        let low_rated = item(1, 2.0);
        let unfinished = item(1, 5.0);

        for i in [&shared_a, &shared_b, &low_rated, &unfinished] {
            catalog.insert(i.clone()).await;
        }

        for item_id in [shared_a.id, shared_b.id] {
            interactions
                .append(record(me, item_id, Some(3.0), 90.0))
                .await
                .unwrap();
            interactions
                .append(record(neighbor, item_id, Some(3.0), 90.0))
                .await
                .unwrap();
        }
        // Rating not above 3 -> does not qualify
        interactions
            .append(record(neighbor, low_rated.id, Some(3.0), 95.0))
            .await
            .unwrap();
        // Completion not above 70 -> does not qualify
        interactions
            .append(record(neighbor, unfinished.id, Some(5.0), 40.0))
            .await
            .unwrap();

        let recommender = build(catalog, interactions).await;
        let profile = UserProfile::new(me);

        let results = recommender.generate(me, &profile, 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_single_shared_item_is_not_a_neighbor() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();

        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let shared = item(1, 4.0);
        let their_find = item(1, 5.0);
        catalog.insert(shared.clone()).await;
        catalog.insert(their_find.clone()).await;

        // Only one shared item: no qualifying neighbor, and my only watch
        // carries no rating, so the seeded pass finds nothing and the
        // strategy lands on popularity.
        interactions
            .append(record(me, shared.id, None, 90.0))
            .await
            .unwrap();
        interactions
            .append(record(other, shared.id, Some(5.0), 90.0))
            .await
            .unwrap();
        interactions
            .append(record(other, their_find.id, Some(5.0), 90.0))
            .await
            .unwrap();

        let recommender = build(catalog, interactions).await;
        let profile = UserProfile::new(me);

        let results = recommender.generate(me, &profile, 10).await;
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.score == 0.6));
        assert!(results
            .iter()
            .all(|r| r.reason == "Popular across the library"));
    }

    #[tokio::test]
    async fn test_seeded_content_fallback_from_own_history() {
        let catalog = InMemoryCatalogStore::new();
        let interactions = InMemoryInteractionStore::new();

        let me = Uuid::new_v4();
        let mut liked = item(1, 4.0);
        liked.tags = vec!["outdoor".to_string(), "modern".to_string()];
        let mut similar = item(1, 4.5);
        similar.tags = vec!["outdoor".to_string()];
        catalog.insert(liked.clone()).await;
        catalog.insert(similar.clone()).await;

        interactions
            .append(record(me, liked.id, Some(4.5), 100.0))
            .await
            .unwrap();

        let recommender = build(catalog, interactions).await;
        let profile = UserProfile::new(me);

        let results = recommender.generate(me, &profile, 10).await;
        assert!(!results.is_empty());
        // Seeded pass output is relabeled as collaborative
        assert!(results
            .iter()
            .all(|r| r.algorithm == Algorithm::Collaborative));
        assert!(results.iter().any(|r| r.item.id == similar.id));
    }

    #[tokio::test]
    async fn test_history_read_failure_degrades_to_popularity() {
        let catalog = InMemoryCatalogStore::new();
        let popular = item(10, 4.0);
        catalog.insert(popular.clone()).await;

        let mut interactions = MockInteractionStore::new();
        interactions
            .expect_find_by_user()
            .returning(|_| Err(StoreError::Backend("interactions down".to_string())));

        let catalog: Arc<dyn CatalogStore> = Arc::new(catalog);
        let content = Arc::new(ContentRecommender::new(catalog.clone()));
        let recommender =
            CollaborativeRecommender::new(catalog, Arc::new(interactions), content, 10);

        let profile = UserProfile::new(Uuid::new_v4());
        let results = recommender.generate(profile.user_id, &profile, 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, popular.id);
        assert_eq!(results[0].score, 0.6);
    }
}
