//! Comment quality filters
//!
//! A strictly eliminative chain: a comment must look meaningful, be detected
//! as English, and share at least one keyword with the question. Each stage
//! only removes candidates; nothing downstream can resurrect a dropped one.

use regex::RegexSet;
use whatlang::Lang;

use super::config::RelevanceConfig;

/// Patterns matching promo spam, link drops, and one-word praise.
/// Matched against lowercased text.
const SPAM_PATTERNS: &[&str] = &[
    r"subscribe",
    r"follow me",
    r"check (out )?my channel",
    r"giveaway",
    r"https?://",
    r"www\.",
    r"#\w+",
    r"@\w+",
    r"\b(?:like|share|comment)\b",
    r"^nice( video)?!?$",
    r"^cool!?$",
    r"^awesome!?$",
    r"^first!?$",
    r"^lol!?$",
];

/// Compiled quality gate shared across all comments of a run.
#[derive(Debug)]
pub struct CommentFilter {
    min_chars: usize,
    min_words: usize,
    max_symbol_ratio: f64,
    spam: RegexSet,
}

impl CommentFilter {
    pub fn new(config: &RelevanceConfig) -> Self {
        let spam = RegexSet::new(SPAM_PATTERNS).expect("spam patterns must compile");
        Self {
            min_chars: config.min_chars,
            min_words: config.min_words,
            max_symbol_ratio: config.max_symbol_ratio,
            spam,
        }
    }

    /// Length, word count, symbol ratio, and spam pattern heuristics.
    pub fn looks_meaningful(&self, text: &str) -> bool {
        if text.chars().count() < self.min_chars {
            return false;
        }
        if text.split_whitespace().count() < self.min_words {
            return false;
        }
        let total = text.chars().count().max(1);
        let symbols = text
            .chars()
            .filter(|ch| !ch.is_alphanumeric() && !ch.is_whitespace())
            .count();
        if symbols as f64 / total as f64 > self.max_symbol_ratio {
            return false;
        }
        !self.spam.is_match(&text.to_lowercase())
    }

    /// Strict English check; a failed detection rejects the comment.
    pub fn is_english(&self, text: &str) -> bool {
        match whatlang::detect(text) {
            Some(info) => info.lang() == Lang::Eng,
            None => false,
        }
    }

    /// The comment must connect to the question: at least one shared keyword.
    pub fn overlaps_question(&self, text: &str, question_keywords: &[String]) -> bool {
        let lower = text.to_lowercase();
        question_keywords.iter().any(|kw| lower.contains(kw.as_str()))
    }

    /// Full chain, in elimination-cost order.
    pub fn passes(&self, text: &str, question_keywords: &[String]) -> bool {
        self.looks_meaningful(text)
            && self.is_english(text)
            && self.overlaps_question(text, question_keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> CommentFilter {
        CommentFilter::new(&RelevanceConfig::default())
    }

    #[test]
    fn short_comments_are_rejected() {
        let f = filter();
        assert!(!f.looks_meaningful("nice"));
        assert!(!f.looks_meaningful("great bag, love it"));
    }

    #[test]
    fn substantial_comments_pass_the_heuristics() {
        let f = filter();
        assert!(f.looks_meaningful(
            "The leather quality on this tote surprised me, holding up well after a year of daily use."
        ));
    }

    #[test]
    fn spam_and_link_drops_are_rejected() {
        let f = filter();
        assert!(!f.looks_meaningful(
            "Check out my channel for more reviews of bags and other daily carry gear"
        ));
        assert!(!f.looks_meaningful(
            "Found a cheaper option over at https://example.com with similar leather goods"
        ));
    }

    #[test]
    fn symbol_heavy_comments_are_rejected() {
        let f = filter();
        assert!(!f.looks_meaningful("!!!! $$$ ???? **** ++++ wow bag good yes !!!! $$$ ????"));
    }

    #[test]
    fn non_english_comments_are_rejected() {
        let f = filter();
        assert!(f.is_english(
            "This backpack held up through two years of commuting and still looks new."
        ));
        assert!(!f.is_english(
            "Esta mochila es increíble, la uso todos los días y sigue como nueva."
        ));
    }

    #[test]
    fn comment_must_overlap_question_keywords() {
        let f = filter();
        let keywords = vec!["durability".to_string(), "leather".to_string()];
        assert!(f.overlaps_question("the leather softened nicely", &keywords));
        assert!(!f.overlaps_question("shipping took three weeks", &keywords));
    }
}
