use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user personalization profile read by every recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub preferred_tags: Vec<String>,
    pub preferred_performers: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub blocked_tags: Vec<String>,
    pub blocked_performers: Vec<String>,
    /// Items below this rating are never recommended to the user
    pub min_rating: f64,
    pub min_duration_seconds: Option<u32>,
    pub max_duration_seconds: Option<u32>,
    /// When the engine last regenerated this user's recommendations
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Creates an empty profile for a user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            preferred_tags: Vec::new(),
            preferred_performers: Vec::new(),
            preferred_categories: Vec::new(),
            blocked_tags: Vec::new(),
            blocked_performers: Vec::new(),
            min_rating: 0.0,
            min_duration_seconds: None,
            max_duration_seconds: None,
            last_refreshed_at: None,
        }
    }

    /// Applies a partial preference update, leaving unset fields untouched
    pub fn apply(&mut self, update: PreferenceUpdate) {
        if let Some(tags) = update.preferred_tags {
            self.preferred_tags = tags;
        }
        if let Some(performers) = update.preferred_performers {
            self.preferred_performers = performers;
        }
        if let Some(categories) = update.preferred_categories {
            self.preferred_categories = categories;
        }
        if let Some(tags) = update.blocked_tags {
            self.blocked_tags = tags;
        }
        if let Some(performers) = update.blocked_performers {
            self.blocked_performers = performers;
        }
        if let Some(min_rating) = update.min_rating {
            self.min_rating = min_rating.clamp(0.0, 5.0);
        }
        if let Some(min_duration) = update.min_duration_seconds {
            self.min_duration_seconds = min_duration;
        }
        if let Some(max_duration) = update.max_duration_seconds {
            self.max_duration_seconds = max_duration;
        }
    }
}

/// Partial update for a user's preferences
///
/// `None` fields are left as-is; `Some` fields replace the stored value.
/// Duration bounds are doubly optional so a caller can clear a bound by
/// sending `Some(None)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceUpdate {
    pub preferred_tags: Option<Vec<String>>,
    pub preferred_performers: Option<Vec<String>>,
    pub preferred_categories: Option<Vec<String>>,
    pub blocked_tags: Option<Vec<String>>,
    pub blocked_performers: Option<Vec<String>>,
    pub min_rating: Option<f64>,
    pub min_duration_seconds: Option<Option<u32>>,
    pub max_duration_seconds: Option<Option<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_update() {
        let mut profile = UserProfile::new(Uuid::new_v4());
        profile.preferred_tags = vec!["outdoor".to_string()];
        profile.min_rating = 2.0;

        profile.apply(PreferenceUpdate {
            blocked_tags: Some(vec!["vintage".to_string()]),
            min_rating: Some(3.5),
            ..Default::default()
        });

        // Updated fields
        assert_eq!(profile.blocked_tags, vec!["vintage".to_string()]);
        assert_eq!(profile.min_rating, 3.5);
        // Untouched field
        assert_eq!(profile.preferred_tags, vec!["outdoor".to_string()]);
    }

    #[test]
    fn test_apply_clamps_min_rating() {
        let mut profile = UserProfile::new(Uuid::new_v4());
        profile.apply(PreferenceUpdate {
            min_rating: Some(9.0),
            ..Default::default()
        });
        assert_eq!(profile.min_rating, 5.0);
    }

    #[test]
    fn test_apply_can_clear_duration_bound() {
        let mut profile = UserProfile::new(Uuid::new_v4());
        profile.max_duration_seconds = Some(1800);

        profile.apply(PreferenceUpdate {
            max_duration_seconds: Some(None),
            ..Default::default()
        });
        assert_eq!(profile.max_duration_seconds, None);
    }
}
