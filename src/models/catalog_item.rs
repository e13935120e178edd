use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FeatureProfile;

/// A single video in the managed library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Unique identifier for the item
    pub id: Uuid,
    /// Display title, also the input to lexical feature extraction
    pub title: String,
    /// Original locator the item was imported from, if known
    pub source_url: Option<String>,
    pub tags: Vec<String>,
    pub performers: Vec<String>,
    pub categories: Vec<String>,
    /// Library rating on a 0-5 scale
    pub rating: f64,
    pub duration_seconds: u32,
    /// Cumulative view counter, bumped once per recorded interaction
    pub view_count: u64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    /// Derived feature profile, computed lazily and cached here
    pub features: Option<FeatureProfile>,
    pub added_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Creates a bare item with fresh id and empty metadata
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            source_url: None,
            tags: Vec::new(),
            performers: Vec::new(),
            categories: Vec::new(),
            rating: 0.0,
            duration_seconds: 0,
            view_count: 0,
            last_viewed_at: None,
            features: None,
            added_at: Utc::now(),
        }
    }

    /// True when any of the item's tags appears in `tags`
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    /// True when any of the item's performers appears in `performers`
    pub fn has_any_performer(&self, performers: &[String]) -> bool {
        self.performers.iter().any(|p| performers.contains(p))
    }
}
