use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable record of a single watch event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub watch_duration_seconds: u32,
    /// How much of the item was watched, 0-100
    pub completion_percentage: f64,
    /// Explicit rating given during the session, 0-5
    pub rating: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Caller-supplied payload for recording an interaction
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRequest {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub watch_duration_seconds: u32,
    pub completion_percentage: f64,
    pub rating: Option<f64>,
}

impl InteractionRequest {
    /// Converts the request into a record stamped at `recorded_at`,
    /// clamping completion to 0-100 and rating to 0-5
    pub fn into_record(self, recorded_at: DateTime<Utc>) -> InteractionRecord {
        InteractionRecord {
            user_id: self.user_id,
            item_id: self.item_id,
            watch_duration_seconds: self.watch_duration_seconds,
            completion_percentage: self.completion_percentage.clamp(0.0, 100.0),
            rating: self.rating.map(|r| r.clamp(0.0, 5.0)),
            recorded_at,
        }
    }
}
