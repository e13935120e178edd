use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{RecommendationResult, UserProfile};
use crate::stores::InteractionStore;

/// Post-processing pass applied after any recommender
///
/// Exclusion logic lives here and only here, so every strategy's output
/// passes the same watched-history and blocklist checks.
pub struct ExclusionFilter {
    interactions: Arc<dyn InteractionStore>,
}

impl ExclusionFilter {
    pub fn new(interactions: Arc<dyn InteractionStore>) -> Self {
        Self { interactions }
    }

    /// Drops watched items (when requested) and anything carrying a
    /// blocked tag or performer
    pub async fn apply(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        exclude_watched: bool,
        results: Vec<RecommendationResult>,
    ) -> Vec<RecommendationResult> {
        let watched: HashSet<Uuid> = if exclude_watched {
            match self.interactions.find_by_user(user_id).await {
                Ok(records) => records.into_iter().map(|r| r.item_id).collect(),
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "History read failed, skipping watched-item exclusion"
                    );
                    HashSet::new()
                }
            }
        } else {
            HashSet::new()
        };

        let before = results.len();
        let filtered: Vec<RecommendationResult> = results
            .into_iter()
            .filter(|result| {
                !watched.contains(&result.item.id)
                    && !result.item.has_any_tag(&profile.blocked_tags)
                    && !result.item.has_any_performer(&profile.blocked_performers)
            })
            .collect();

        if filtered.len() < before {
            tracing::debug!(
                user_id = %user_id,
                dropped = before - filtered.len(),
                "Exclusion filter dropped candidates"
            );
        }

        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Algorithm, CatalogItem, InteractionRecord};
    use crate::stores::memory::InMemoryInteractionStore;
    use chrono::Utc;

    fn recommendation(item: CatalogItem) -> RecommendationResult {
        RecommendationResult {
            item,
            score: 0.5,
            reason: "r".to_string(),
            algorithm: Algorithm::ContentBased,
        }
    }

    #[tokio::test]
    async fn test_drops_watched_items_when_requested() {
        let interactions = InMemoryInteractionStore::new();
        let user_id = Uuid::new_v4();
        let watched = CatalogItem::new("watched");
        let fresh = CatalogItem::new("fresh");

        interactions
            .append(InteractionRecord {
                user_id,
                item_id: watched.id,
                watch_duration_seconds: 100,
                completion_percentage: 100.0,
                rating: None,
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();

        let filter = ExclusionFilter::new(Arc::new(interactions));
        let profile = UserProfile::new(user_id);

        let results = filter
            .apply(
                user_id,
                &profile,
                true,
                vec![recommendation(watched.clone()), recommendation(fresh.clone())],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, fresh.id);
    }

    #[tokio::test]
    async fn test_keeps_watched_items_when_not_requested() {
        let interactions = InMemoryInteractionStore::new();
        let user_id = Uuid::new_v4();
        let watched = CatalogItem::new("watched");

        interactions
            .append(InteractionRecord {
                user_id,
                item_id: watched.id,
                watch_duration_seconds: 100,
                completion_percentage: 100.0,
                rating: None,
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();

        let filter = ExclusionFilter::new(Arc::new(interactions));
        let profile = UserProfile::new(user_id);

        let results = filter
            .apply(user_id, &profile, false, vec![recommendation(watched)])
            .await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_blocklist_always_applies() {
        let filter = ExclusionFilter::new(Arc::new(InMemoryInteractionStore::new()));
        let user_id = Uuid::new_v4();

        let mut profile = UserProfile::new(user_id);
        profile.blocked_tags = vec!["vintage".to_string()];
        profile.blocked_performers = vec!["Sam Cole".to_string()];

        let mut tagged = CatalogItem::new("tagged");
        tagged.tags = vec!["vintage".to_string()];
        let mut cast = CatalogItem::new("cast");
        cast.performers = vec!["Sam Cole".to_string()];
        let clean = CatalogItem::new("clean");

        // exclude_watched is off; the blocklist still applies
        let results = filter
            .apply(
                user_id,
                &profile,
                false,
                vec![
                    recommendation(tagged),
                    recommendation(cast),
                    recommendation(clean.clone()),
                ],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, clean.id);
    }
}
