use serde::{Deserialize, Serialize};

/// Derived structured representation of a catalog item
///
/// Computed lazily by the feature extractor from item metadata and cached
/// on the item so repeated similarity queries skip recomputation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureProfile {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub themes: Vec<String>,
    pub visual_style: Vec<String>,
    pub technical_aspects: Vec<String>,
    pub performers: Vec<String>,
    pub content_type: String,
}

impl Default for FeatureProfile {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            tags: Vec::new(),
            themes: Vec::new(),
            visual_style: Vec::new(),
            technical_aspects: Vec::new(),
            performers: Vec::new(),
            content_type: "video".to_string(),
        }
    }
}

impl FeatureProfile {
    /// True when the cached profile carries enough derived data that a
    /// fresh extraction pass would add nothing useful
    pub fn is_sufficient(&self) -> bool {
        self.tags.len() >= 3 || !self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_generic_video() {
        let profile = FeatureProfile::default();
        assert_eq!(profile.content_type, "video");
        assert!(profile.tags.is_empty());
        assert!(!profile.is_sufficient());
    }

    #[test]
    fn test_is_sufficient_with_tags() {
        let profile = FeatureProfile {
            tags: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        assert!(profile.is_sufficient());
    }

    #[test]
    fn test_is_sufficient_with_category() {
        let profile = FeatureProfile {
            categories: vec!["amateur".into()],
            ..Default::default()
        };
        assert!(profile.is_sufficient());
    }
}
