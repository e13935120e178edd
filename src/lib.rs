//! Personalization and similarity engine for a video library manager.
//!
//! Blends collaborative, content-based and trending signals into ranked
//! recommendations, and derives per-item feature profiles for "find
//! similar" queries and auto-tagging. Storage, HTTP and rendering live
//! behind trait seams; in-memory reference stores ship for tests and
//! embedders without infrastructure.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod stores;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use models::{
    Algorithm, CachedRecommendation, CatalogItem, FeatureProfile, InteractionRecord,
    InteractionRequest, PreferenceUpdate, RecommendationResult, SimilarityResult, UserProfile,
};
pub use services::RecommendationEngine;
