use serde::Deserialize;

/// Engine tuning parameters loaded from environment variables
///
/// Every field has a default that matches the engine's documented
/// behavior; overrides exist for operational tuning, not to change the
/// scoring contracts (blend weights are fixed constants in the services).
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Rolling window, in days, used by the trending strategy
    #[serde(default = "default_trending_window_days")]
    pub trending_window_days: i64,

    /// Minimum independent view events inside the window for an item to trend
    #[serde(default = "default_trending_min_views")]
    pub trending_min_views: u64,

    /// Minimum similarity score for "find similar" candidates
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum number of neighbor users considered by collaborative filtering
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,

    /// Items analyzed per chunk during batch feature extraction
    #[serde(default = "default_batch_chunk_size")]
    pub batch_chunk_size: usize,

    /// Candidate overfetch factor applied before blending and filtering
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: f64,
}

fn default_trending_window_days() -> i64 {
    7
}

fn default_trending_min_views() -> u64 {
    3
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_neighbor_limit() -> usize {
    10
}

fn default_batch_chunk_size() -> usize {
    10
}

fn default_overfetch_factor() -> f64 {
    1.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trending_window_days: default_trending_window_days(),
            trending_min_views: default_trending_min_views(),
            similarity_threshold: default_similarity_threshold(),
            neighbor_limit: default_neighbor_limit(),
            batch_chunk_size: default_batch_chunk_size(),
            overfetch_factor: default_overfetch_factor(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables (ENGINE_ prefix)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("ENGINE_")
            .from_env::<EngineConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load engine config: {}", e))
    }
}
