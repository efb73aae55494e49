//! Configuration for the comment relevance pipeline

use std::collections::HashMap;

/// Default similarity floor for retained comments
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.25;

/// Tuning knobs for query expansion, filtering, and rerank.
///
/// Defaults are deliberately strict: the pipeline prefers returning nothing
/// over returning noise.
#[derive(Debug, Clone)]
pub struct RelevanceConfig {
    /// Cosine similarity floor; comments scoring below it are dropped
    pub min_similarity: f64,

    /// Maximum retained comments per video
    pub max_comments: usize,

    /// Maximum videos fetched per question
    pub max_videos: usize,

    /// Cap on expanded search queries per question
    pub max_queries: usize,

    /// Minimum word count for a comment to be considered meaningful
    pub min_words: usize,

    /// Minimum character count for a comment
    pub min_chars: usize,

    /// Maximum ratio of non-alphanumeric non-space characters
    pub max_symbol_ratio: f64,

    /// Known alias spellings per lowercased brand name
    pub brand_aliases: HashMap<String, Vec<String>>,

    /// Per-brand terms that mark a video as off topic
    pub negative_keywords: HashMap<String, Vec<String>>,

    /// Domain vocabulary mixed into expanded queries
    pub category_keywords: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        let brand_aliases = [
            (
                "brother vellies",
                vec!["brother vellies", "aurora james", "bvellies"],
            ),
            (
                "able",
                vec!["able carry", "able bags", "able brand", "able leather"],
            ),
            ("soko", vec!["soko jewelry", "shop soko", "soko kenya"]),
            (
                "accompany",
                vec![
                    "accompany",
                    "accompanyus",
                    "accompany shop",
                    "accompany fair trade",
                ],
            ),
            (
                "mz fair trade",
                vec!["mz fair trade", "mz fairtrade", "mz made by"],
            ),
        ]
        .into_iter()
        .map(|(brand, aliases)| {
            (
                brand.to_string(),
                aliases.into_iter().map(String::from).collect(),
            )
        })
        .collect();

        let negative_keywords = [
            (
                "soko",
                vec!["grand seiko", "seiko", "butcher", "restaurant", "rooftop"],
            ),
            (
                "accompany",
                vec!["bob seger", "song", "reaction", "kneecap", "film", "movie"],
            ),
            (
                "mz fair trade",
                vec!["zainuddin", "mz kh", "k.h zainuddin", "sermon"],
            ),
        ]
        .into_iter()
        .map(|(brand, kws)| {
            (
                brand.to_string(),
                kws.into_iter().map(String::from).collect(),
            )
        })
        .collect();

        let category_keywords = [
            "bag",
            "leather",
            "handbag",
            "wallet",
            "tote",
            "backpack",
            "jewelry",
            "earrings",
            "necklace",
            "bracelet",
            "ring",
            "fair trade",
            "artisan",
            "craft",
            "handcrafted",
            "ethical",
            "sustainable",
            "review",
            "unboxing",
            "brand",
            "story",
            "pricing",
            "price",
            "testimonial",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_comments: 5,
            max_videos: 5,
            max_queries: 6,
            min_words: 6,
            min_chars: 25,
            max_symbol_ratio: 0.4,
            brand_aliases,
            negative_keywords,
            category_keywords,
        }
    }
}

impl RelevanceConfig {
    pub fn builder() -> RelevanceConfigBuilder {
        RelevanceConfigBuilder::default()
    }

    /// Alias list for a brand; a brand without configured aliases gets its
    /// own lowercased name.
    pub fn aliases_for(&self, brand: &str) -> Vec<String> {
        let brand_lc = brand.trim().to_lowercase();
        self.brand_aliases
            .get(&brand_lc)
            .cloned()
            .unwrap_or_else(|| vec![brand_lc])
    }

    pub fn negatives_for(&self, brand: &str) -> &[String] {
        self.negative_keywords
            .get(&brand.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Builder for [`RelevanceConfig`]
#[derive(Debug, Default)]
pub struct RelevanceConfigBuilder {
    min_similarity: Option<f64>,
    max_comments: Option<usize>,
    max_videos: Option<usize>,
    max_queries: Option<usize>,
    min_words: Option<usize>,
    min_chars: Option<usize>,
}

impl RelevanceConfigBuilder {
    pub fn min_similarity(mut self, value: f64) -> Self {
        self.min_similarity = Some(value);
        self
    }

    pub fn max_comments(mut self, value: usize) -> Self {
        self.max_comments = Some(value);
        self
    }

    pub fn max_videos(mut self, value: usize) -> Self {
        self.max_videos = Some(value);
        self
    }

    pub fn max_queries(mut self, value: usize) -> Self {
        self.max_queries = Some(value);
        self
    }

    pub fn min_words(mut self, value: usize) -> Self {
        self.min_words = Some(value);
        self
    }

    pub fn min_chars(mut self, value: usize) -> Self {
        self.min_chars = Some(value);
        self
    }

    pub fn build(self) -> RelevanceConfig {
        let defaults = RelevanceConfig::default();
        RelevanceConfig {
            min_similarity: self.min_similarity.unwrap_or(defaults.min_similarity),
            max_comments: self.max_comments.unwrap_or(defaults.max_comments),
            max_videos: self.max_videos.unwrap_or(defaults.max_videos),
            max_queries: self.max_queries.unwrap_or(defaults.max_queries),
            min_words: self.min_words.unwrap_or(defaults.min_words),
            min_chars: self.min_chars.unwrap_or(defaults.min_chars),
            ..defaults
        }
    }
}
