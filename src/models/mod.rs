mod catalog_item;
mod feature_profile;
mod interaction;
mod recommendation;
mod user_profile;

pub use catalog_item::CatalogItem;
pub use feature_profile::FeatureProfile;
pub use interaction::{InteractionRecord, InteractionRequest};
pub use recommendation::{
    Algorithm, CachedRecommendation, RecommendationResult, SimilarityResult,
};
pub use user_profile::{PreferenceUpdate, UserProfile};

/// Clamps a score into the [0, 1] range every result type requires
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}
