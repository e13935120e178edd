mod collaborative;
mod content_based;
mod engine;
mod exclusion;
mod features;
mod hybrid;
mod interactions;
mod similarity;
mod trending;

pub use collaborative::CollaborativeRecommender;
pub use content_based::ContentRecommender;
pub use engine::RecommendationEngine;
pub use exclusion::ExclusionFilter;
pub use features::FeatureExtractor;
pub use hybrid::HybridBlender;
pub use interactions::InteractionRecorder;
pub use similarity::SimilarityEngine;
pub use trending::TrendingRecommender;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Algorithm, RecommendationResult, UserProfile};

/// A single candidate-scoring strategy
///
/// Implementations never surface collaborator failures: each strategy
/// catches store errors internally and degrades to its documented
/// fallback or an empty list.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn generate(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        limit: usize,
    ) -> Vec<RecommendationResult>;

    fn algorithm(&self) -> Algorithm;
}
