use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::models::{CatalogItem, FeatureProfile};
use crate::stores::CatalogStore;

/// Keyword dictionaries driving the lexical pass
const CATEGORY_KEYWORDS: &[&str] = &[
    "amateur",
    "professional",
    "fetish",
    "romantic",
    "hardcore",
    "softcore",
];
const THEME_KEYWORDS: &[&str] = &[
    "outdoor", "indoor", "vintage", "modern", "group", "solo", "couple",
];
const VISUAL_STYLE_KEYWORDS: &[&str] = &["pov", "close-up", "wide-shot", "artistic", "raw"];
const QUALITY_MARKERS: &[&str] = &["4k", "2160p", "1080p", "hd", "720p"];

const MIN_TAG_LEN: usize = 3;
const CLIP_MAX_SECONDS: u32 = 600;
const FEATURE_MIN_SECONDS: u32 = 3600;

/// Credited performers appear in phrases like "with Dana Blake",
/// "starring Alex Reed" or "featuring Sam Cole"; the name capture stays
/// case-sensitive so only capitalized tokens are treated as names
static PERFORMER_CREDIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:with|starring|featuring)\s+([A-Z][A-Za-z'\-]*(?:\s+[A-Z][A-Za-z'\-]*)?)")
        .expect("performer credit pattern is valid")
});

/// Derives a structured feature profile for a catalog item
///
/// Two heuristic passes: baseline hints from the item's hosting domain and
/// locator, then lexical analysis of the title against the keyword
/// dictionaries. Computed profiles are written back to the catalog so
/// repeated similarity queries skip recomputation.
pub struct FeatureExtractor {
    catalog: Arc<dyn CatalogStore>,
    chunk_size: usize,
}

impl FeatureExtractor {
    pub fn new(catalog: Arc<dyn CatalogStore>, chunk_size: usize) -> Self {
        Self {
            catalog,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Returns the item's feature profile, extracting and caching it when
    /// the stored one is missing or too thin to be useful
    pub async fn analyze(&self, item: &CatalogItem) -> FeatureProfile {
        if let Some(cached) = &item.features {
            if cached.is_sufficient() {
                return cached.clone();
            }
        }

        let profile = derive_features(item);

        if let Err(e) = self
            .catalog
            .store_features(item.id, profile.clone())
            .await
        {
            tracing::warn!(item_id = %item.id, error = %e, "Failed to cache feature profile");
        }

        profile
    }

    /// Extracts profiles for many items, processing fixed-size chunks to
    /// bound concurrent extraction work; returns how many were analyzed
    pub async fn batch_analyze(&self, item_ids: &[Uuid]) -> usize {
        let mut analyzed = 0;

        for chunk in item_ids.chunks(self.chunk_size) {
            let lookups = chunk.iter().map(|&item_id| async move {
                match self.catalog.get(item_id).await {
                    Ok(Some(item)) => {
                        self.analyze(&item).await;
                        true
                    }
                    Ok(None) => false,
                    Err(e) => {
                        tracing::warn!(item_id = %item_id, error = %e, "Skipping item in batch analysis");
                        false
                    }
                }
            });
            analyzed += join_all(lookups).await.into_iter().filter(|ok| *ok).count();
        }

        tracing::debug!(requested = item_ids.len(), analyzed, "Batch feature analysis done");
        analyzed
    }
}

/// Pure derivation of a feature profile from item metadata
pub fn derive_features(item: &CatalogItem) -> FeatureProfile {
    let title_lower = item.title.to_lowercase();

    let mut tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();
    let mut categories: Vec<String> =
        item.categories.iter().map(|c| c.to_lowercase()).collect();
    let mut technical_aspects = Vec::new();
    let mut performers = item.performers.clone();

    // Pass 1: source heuristics from the hosting domain and locator
    if let Some(locator) = &item.source_url {
        let locator_lower = locator.to_lowercase();
        for marker in QUALITY_MARKERS {
            if locator_lower.contains(marker) {
                technical_aspects.push(marker.to_string());
            }
        }
        for token in host_tokens(locator) {
            if CATEGORY_KEYWORDS.contains(&token.as_str()) {
                categories.push(token.clone());
            }
            if CATEGORY_KEYWORDS.contains(&token.as_str())
                || THEME_KEYWORDS.contains(&token.as_str())
            {
                tags.push(token);
            }
        }
    }

    // Pass 2: lexical analysis of the title
    categories.extend(dictionary_hits(&title_lower, CATEGORY_KEYWORDS));
    let themes = dictionary_hits(&title_lower, THEME_KEYWORDS);
    let visual_style = dictionary_hits(&title_lower, VISUAL_STYLE_KEYWORDS);
    for marker in QUALITY_MARKERS {
        if title_lower.contains(marker) {
            technical_aspects.push(marker.to_string());
        }
    }
    tags.extend(themes.iter().cloned());
    tags.extend(dictionary_hits(&title_lower, CATEGORY_KEYWORDS));

    for capture in PERFORMER_CREDIT.captures_iter(&item.title) {
        if let Some(name) = capture.get(1) {
            performers.push(name.as_str().trim().to_string());
        }
    }

    FeatureProfile {
        categories: dedupe(categories),
        tags: dedupe(tags)
            .into_iter()
            .filter(|t| t.len() >= MIN_TAG_LEN)
            .collect(),
        themes: dedupe(themes),
        visual_style: dedupe(visual_style),
        technical_aspects: dedupe(technical_aspects),
        performers: dedupe(performers),
        content_type: content_type_for(item.duration_seconds),
    }
}

/// Dictionary keywords found in the text; hyphenated keywords also match
/// their space-separated form
fn dictionary_hits(text_lower: &str, keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|keyword| {
            text_lower.contains(*keyword)
                || (keyword.contains('-')
                    && text_lower.contains(&keyword.replace('-', " ")))
        })
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Lowercased host-name tokens of the locator ("videos.outdoor-hub.example"
/// yields ["videos", "outdoor", "hub", "example"])
fn host_tokens(locator: &str) -> Vec<String> {
    let Ok(url) = Url::parse(locator) else {
        return Vec::new();
    };
    let Some(host) = url.host_str() else {
        return Vec::new();
    };
    host.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

fn content_type_for(duration_seconds: u32) -> String {
    if duration_seconds > 0 && duration_seconds < CLIP_MAX_SECONDS {
        "clip".to_string()
    } else if duration_seconds >= FEATURE_MIN_SECONDS {
        "feature".to_string()
    } else {
        "video".to_string()
    }
}

/// Removes duplicates while preserving first-seen order
fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
