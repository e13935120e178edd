pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    CachedRecommendation, CatalogItem, FeatureProfile, InteractionRecord, UserProfile,
};

/// Failures raised by the storage collaborators
///
/// The engine treats these as degradation signals, not hard errors: each
/// strategy catches them and falls back per its documented behavior.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// "Contains any of" filter against the catalog
///
/// Matching is inclusive across the `any_*` facets: an item qualifies when
/// it carries at least one value from any populated facet, then must also
/// satisfy the rating and duration bounds.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub any_tags: Vec<String>,
    pub any_performers: Vec<String>,
    pub any_categories: Vec<String>,
    pub min_rating: Option<f64>,
    pub min_duration_seconds: Option<u32>,
    pub max_duration_seconds: Option<u32>,
}

impl CatalogFilter {
    /// True when the item satisfies this filter
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let has_facets = !self.any_tags.is_empty()
            || !self.any_performers.is_empty()
            || !self.any_categories.is_empty();

        if has_facets {
            let facet_hit = item.has_any_tag(&self.any_tags)
                || item.has_any_performer(&self.any_performers)
                || item.categories.iter().any(|c| self.any_categories.contains(c));
            if !facet_hit {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if item.rating < min_rating {
                return false;
            }
        }
        if let Some(min_duration) = self.min_duration_seconds {
            if item.duration_seconds < min_duration {
                return false;
            }
        }
        if let Some(max_duration) = self.max_duration_seconds {
            if item.duration_seconds > max_duration {
                return false;
            }
        }

        true
    }
}

/// Per-item view aggregates within a time window
#[derive(Debug, Clone, PartialEq)]
pub struct ItemViewStats {
    pub item_id: Uuid,
    pub view_count: u64,
    pub average_rating: Option<f64>,
}

/// Read/write access to the item catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, item_id: Uuid) -> StoreResult<Option<CatalogItem>>;

    async fn list_all(&self) -> StoreResult<Vec<CatalogItem>>;

    /// Global popularity ranking: view count desc, then rating desc
    async fn top_by_popularity(&self, limit: usize) -> StoreResult<Vec<CatalogItem>>;

    /// Filtered listing via the explicit any-of capability
    async fn filter_any_of(&self, filter: CatalogFilter) -> StoreResult<Vec<CatalogItem>>;

    /// Increments the view counter by one and updates last-viewed
    async fn record_view(&self, item_id: Uuid, viewed_at: DateTime<Utc>) -> StoreResult<()>;

    /// Writes a derived feature profile back onto the item
    async fn store_features(&self, item_id: Uuid, features: FeatureProfile) -> StoreResult<()>;
}

/// Read/write access to user personalization profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>>;

    async fn upsert(&self, profile: UserProfile) -> StoreResult<()>;

    /// Stamps the time the user's recommendations were last regenerated
    async fn set_last_refreshed(&self, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

/// Append-only store of watch events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn append(&self, record: InteractionRecord) -> StoreResult<()>;

    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<InteractionRecord>>;

    async fn find_by_item(&self, item_id: Uuid) -> StoreResult<Vec<InteractionRecord>>;

    async fn list_all(&self) -> StoreResult<Vec<InteractionRecord>>;

    /// Per-item view counts and average ratings for events at or after `since`
    async fn recent_view_stats(&self, since: DateTime<Utc>) -> StoreResult<Vec<ItemViewStats>>;
}

/// Advisory store of the last generated recommendation list per user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationCacheStore: Send + Sync {
    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<()>;

    async fn insert_many(
        &self,
        user_id: Uuid,
        entries: Vec<CachedRecommendation>,
    ) -> StoreResult<()>;

    async fn get_for_user(&self, user_id: Uuid) -> StoreResult<Vec<CachedRecommendation>>;
}
