use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{
    CollaborativeRecommender, ContentRecommender, ExclusionFilter, FeatureExtractor,
    HybridBlender, InteractionRecorder, Recommender, SimilarityEngine, TrendingRecommender,
};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    Algorithm, CachedRecommendation, InteractionRequest, PreferenceUpdate, RecommendationResult,
    SimilarityResult, UserProfile,
};
use crate::stores::{
    CatalogStore, InteractionStore, ProfileStore, RecommendationCacheStore,
};

/// Facade over the personalization and similarity engine
///
/// Wires the scoring strategies, blender, exclusion filter, recorder and
/// similarity pipeline over the four store seams. Every request is a
/// stateless read against the stores except the advisory cache replace
/// and the append-only interaction writes.
pub struct RecommendationEngine {
    profiles: Arc<dyn ProfileStore>,
    cache: Arc<dyn RecommendationCacheStore>,
    collaborative: Arc<CollaborativeRecommender>,
    content: Arc<ContentRecommender>,
    trending: Arc<TrendingRecommender>,
    hybrid: HybridBlender,
    exclusion: ExclusionFilter,
    similarity: SimilarityEngine,
    recorder: InteractionRecorder,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        profiles: Arc<dyn ProfileStore>,
        interactions: Arc<dyn InteractionStore>,
        cache: Arc<dyn RecommendationCacheStore>,
        config: EngineConfig,
    ) -> Self {
        let content = Arc::new(ContentRecommender::new(catalog.clone()));
        let collaborative = Arc::new(CollaborativeRecommender::new(
            catalog.clone(),
            interactions.clone(),
            content.clone(),
            config.neighbor_limit,
        ));
        let trending = Arc::new(TrendingRecommender::new(
            catalog.clone(),
            interactions.clone(),
            config.trending_window_days,
            config.trending_min_views,
        ));
        let hybrid = HybridBlender::new(
            collaborative.clone(),
            content.clone(),
            trending.clone(),
        );
        let exclusion = ExclusionFilter::new(interactions.clone());
        let extractor = FeatureExtractor::new(catalog.clone(), config.batch_chunk_size);
        let similarity =
            SimilarityEngine::new(catalog.clone(), extractor, config.similarity_threshold);
        let recorder = InteractionRecorder::new(catalog, interactions);

        Self {
            profiles,
            cache,
            collaborative,
            content,
            trending,
            hybrid,
            exclusion,
            similarity,
            recorder,
            config,
        }
    }

    /// Generates a ranked recommendation list for the user
    ///
    /// Defaults to the hybrid blend when no algorithm is named. Unknown
    /// users and collaborator failures yield an empty list, never an
    /// error; the freshly generated list replaces the user's cache
    /// entries as one logical operation.
    pub async fn generate_recommendations(
        &self,
        user_id: Uuid,
        limit: usize,
        algorithm: Option<Algorithm>,
        exclude_watched: bool,
    ) -> Vec<RecommendationResult> {
        let profile = match self.profiles.get(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::info!(user_id = %user_id, "No profile for user, returning empty list");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Profile read failed, returning empty list");
                return Vec::new();
            }
        };

        let candidates = match algorithm {
            Some(Algorithm::Collaborative) => {
                self.collaborative.generate(user_id, &profile, limit).await
            }
            Some(Algorithm::ContentBased) => {
                self.content.generate(user_id, &profile, limit).await
            }
            Some(Algorithm::Trending) => {
                self.trending.generate(user_id, &profile, limit).await
            }
            Some(Algorithm::Hybrid) | None => {
                self.hybrid
                    .generate(user_id, &profile, limit, self.config.overfetch_factor)
                    .await
            }
        };

        let mut results = self
            .exclusion
            .apply(user_id, &profile, exclude_watched, candidates)
            .await;
        results.truncate(limit);

        self.replace_cache(user_id, &results).await;

        if let Err(e) = self.profiles.set_last_refreshed(user_id, Utc::now()).await {
            tracing::debug!(user_id = %user_id, error = %e, "Could not stamp last refresh");
        }

        tracing::info!(
            user_id = %user_id,
            count = results.len(),
            algorithm = %algorithm.unwrap_or(Algorithm::Hybrid),
            "Recommendations generated"
        );

        results
    }

    /// Replaces the user's cached entries with the fresh generation
    ///
    /// Delete-all-then-insert-all; any failure is logged and swallowed so
    /// the computed results still reach the caller.
    async fn replace_cache(&self, user_id: Uuid, results: &[RecommendationResult]) {
        let generated_at = Utc::now();
        let entries: Vec<CachedRecommendation> = results
            .iter()
            .map(|result| CachedRecommendation::from_result(result, generated_at))
            .collect();

        if let Err(e) = self.cache.delete_for_user(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Cache delete failed, skipping cache write");
            return;
        }
        if let Err(e) = self.cache.insert_many(user_id, entries).await {
            tracing::warn!(user_id = %user_id, error = %e, "Cache insert failed");
        }
    }

    /// Returns the user's last cached generation, if any
    ///
    /// Advisory only: freshly computed results always win when requested;
    /// this exists so repeat reads can skip recomputation.
    pub async fn cached_recommendations(&self, user_id: Uuid) -> Vec<CachedRecommendation> {
        match self.cache.get_for_user(user_id).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Cache read failed");
                Vec::new()
            }
        }
    }

    /// Records a watch event; never fails the caller
    pub async fn record_interaction(&self, request: InteractionRequest) {
        self.recorder.record(request).await;
    }

    /// Ranks catalog items most similar to the given item
    pub async fn find_similar_items(
        &self,
        item_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<SimilarityResult>> {
        self.similarity.find_similar(item_id, limit).await
    }

    /// Pre-computes feature profiles for many items in bounded chunks
    pub async fn batch_analyze(&self, item_ids: &[Uuid]) -> usize {
        self.similarity.batch_analyze(item_ids).await
    }

    /// Applies a partial preference update, creating the profile if the
    /// user has none yet
    pub async fn update_user_preferences(
        &self,
        user_id: Uuid,
        update: PreferenceUpdate,
    ) -> EngineResult<()> {
        let mut profile = self
            .profiles
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        profile.apply(update);
        self.profiles.upsert(profile).await?;

        tracing::debug!(user_id = %user_id, "User preferences updated");
        Ok(())
    }
}
