//! In-memory reference stores
//!
//! Back the integration tests and let embedders run the engine without
//! external infrastructure. Each store is an `Arc<RwLock<HashMap>>` so
//! clones share state; the cache store keys whole entry lists by user,
//! which makes the delete-then-insert replace atomic per user.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CatalogFilter, CatalogStore, InteractionStore, ItemViewStats, ProfileStore,
    RecommendationCacheStore, StoreResult,
};
use crate::models::{
    CachedRecommendation, CatalogItem, FeatureProfile, InteractionRecord, UserProfile,
};

/// In-memory catalog keyed by item id
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    items: Arc<RwLock<HashMap<Uuid, CatalogItem>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces an item
    pub async fn insert(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id, item);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, item_id: Uuid) -> StoreResult<Option<CatalogItem>> {
        Ok(self.items.read().await.get(&item_id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<CatalogItem>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn top_by_popularity(&self, limit: usize) -> StoreResult<Vec<CatalogItem>> {
        let mut items: Vec<CatalogItem> = self.items.read().await.values().cloned().collect();
        items.sort_by(|a, b| {
            b.view_count.cmp(&a.view_count).then_with(|| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        items.truncate(limit);
        Ok(items)
    }

    async fn filter_any_of(&self, filter: CatalogFilter) -> StoreResult<Vec<CatalogItem>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn record_view(&self, item_id: Uuid, viewed_at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(item) = self.items.write().await.get_mut(&item_id) {
            item.view_count += 1;
            item.last_viewed_at = Some(viewed_at);
        }
        Ok(())
    }

    async fn store_features(&self, item_id: Uuid, features: FeatureProfile) -> StoreResult<()> {
        if let Some(item) = self.items.write().await.get_mut(&item_id) {
            item.features = Some(features);
        }
        Ok(())
    }
}

/// In-memory profile store keyed by user id
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, profile: UserProfile) -> StoreResult<()> {
        self.profiles.write().await.insert(profile.user_id, profile);
        Ok(())
    }

    async fn set_last_refreshed(&self, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(profile) = self.profiles.write().await.get_mut(&user_id) {
            profile.last_refreshed_at = Some(at);
        }
        Ok(())
    }
}

/// Append-only in-memory interaction log
#[derive(Clone, Default)]
pub struct InMemoryInteractionStore {
    records: Arc<RwLock<Vec<InteractionRecord>>>,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn append(&self, record: InteractionRecord) -> StoreResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<InteractionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_item(&self, item_id: Uuid) -> StoreResult<Vec<InteractionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<InteractionRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn recent_view_stats(&self, since: DateTime<Utc>) -> StoreResult<Vec<ItemViewStats>> {
        let records = self.records.read().await;
        let mut stats: HashMap<Uuid, (u64, f64, u64)> = HashMap::new();

        for record in records.iter().filter(|r| r.recorded_at >= since) {
            let entry = stats.entry(record.item_id).or_insert((0, 0.0, 0));
            entry.0 += 1;
            if let Some(rating) = record.rating {
                entry.1 += rating;
                entry.2 += 1;
            }
        }

        Ok(stats
            .into_iter()
            .map(|(item_id, (views, rating_sum, rated))| ItemViewStats {
                item_id,
                view_count: views,
                average_rating: (rated > 0).then(|| rating_sum / rated as f64),
            })
            .collect())
    }
}

/// In-memory advisory recommendation cache
#[derive(Clone, Default)]
pub struct InMemoryRecommendationCache {
    entries: Arc<RwLock<HashMap<Uuid, Vec<CachedRecommendation>>>>,
}

impl InMemoryRecommendationCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationCacheStore for InMemoryRecommendationCache {
    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<()> {
        self.entries.write().await.remove(&user_id);
        Ok(())
    }

    async fn insert_many(
        &self,
        user_id: Uuid,
        entries: Vec<CachedRecommendation>,
    ) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .entry(user_id)
            .or_default()
            .extend(entries);
        Ok(())
    }

    async fn get_for_user(&self, user_id: Uuid) -> StoreResult<Vec<CachedRecommendation>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
