//! Query expansion and video topicality checks
//!
//! Turns one (brand, website, question) triple into a small set of targeted
//! search queries, and decides whether a search hit is actually about the
//! brand rather than a same-named restaurant, song, or watch line.

use url::Url;

use super::config::RelevanceConfig;
use crate::youtube::SearchHit;

/// Filler and research-jargon terms excluded from question keywords.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "for", "to", "of", "in", "on", "with", "by", "from", "into",
    "at", "over", "under", "about", "as", "is", "are", "was", "were", "be", "been", "being",
    "this", "that", "those", "these", "it", "its", "how", "what", "why", "when", "where", "who",
    "which", "does", "do", "did", "has", "have", "had", "their", "them", "they", "you", "we",
    "i", "your", "our", "ours", "his", "her", "hers", "him", "he", "she", "brand", "brands",
    "product", "products", "pricing", "price", "compare", "comparison", "unique", "selling",
    "proposition", "usp", "reviews", "review", "testimonial", "testimonials", "pain", "points",
];

/// Lowercase alphabetic tokens (hyphens allowed), stopword-filtered,
/// longer than two characters.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut keywords = Vec::new();
    let mut current = String::new();
    for ch in lower.chars() {
        if ch.is_ascii_alphabetic() || (ch == '-' && !current.is_empty()) {
            current.push(ch);
        } else if !current.is_empty() {
            push_keyword(&mut keywords, std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        push_keyword(&mut keywords, current);
    }
    keywords
}

fn push_keyword(keywords: &mut Vec<String>, token: String) {
    if token.len() > 2 && !STOPWORDS.contains(&token.as_str()) {
        keywords.push(token);
    }
}

/// Expand one question into search queries: per (alias, key term) review
/// queries, fixed suffix queries, and a brand-plus-domain query. Deduped and
/// capped at `max_queries`.
pub fn build_queries(
    config: &RelevanceConfig,
    brand: &str,
    website: &str,
    question: &str,
) -> Vec<String> {
    let aliases = config.aliases_for(brand);
    let domain = second_level_domain(website);

    let question_keywords = extract_keywords(question);
    let key_terms: Vec<&str> = question_keywords
        .iter()
        .take(4)
        .map(String::as_str)
        .chain(config.category_keywords.iter().map(String::as_str))
        .take(8)
        .collect();

    let mut queries = Vec::new();
    for alias in &aliases {
        for term in &key_terms {
            queries.push(format!("\"{}\" {} review", alias, term));
        }
        queries.push(format!("\"{}\" testimonial", alias));
        queries.push(format!("\"{}\" customer review", alias));
        queries.push(format!("\"{}\" pricing", alias));
        queries.push(format!("\"{}\" artisan", alias));
        queries.push(format!("\"{}\" sustainable", alias));
    }
    if let Some(domain) = domain {
        queries.push(format!("\"{}\" \"{}\"", brand, domain));
    }

    let mut seen = std::collections::HashSet::new();
    let mut deduped = Vec::new();
    for query in queries {
        if seen.insert(query.clone()) {
            deduped.push(query);
        }
        if deduped.len() >= config.max_queries {
            break;
        }
    }
    deduped
}

/// A hit is on topic when its title, description, and channel mention at
/// least one brand alias and none of the brand's negative keywords.
pub fn is_on_topic(config: &RelevanceConfig, hit: &SearchHit, brand: &str) -> bool {
    let text = format!(
        "{} {} {}",
        hit.title.to_lowercase(),
        hit.description.to_lowercase(),
        hit.channel_title.to_lowercase()
    );
    let aliases = config.aliases_for(brand);
    if !aliases.iter().any(|alias| text.contains(alias.as_str())) {
        return false;
    }
    !config
        .negatives_for(brand)
        .iter()
        .any(|neg| text.contains(neg.as_str()))
}

/// Last two host labels of a website URL, e.g. `ablecarry.com`.
fn second_level_domain(website: &str) -> Option<String> {
    let host = Url::parse(website).ok()?.host_str()?.to_string();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, description: &str, channel: &str) -> SearchHit {
        SearchHit {
            video_id: "v".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            channel_title: channel.to_string(),
        }
    }

    #[test]
    fn keywords_drop_stopwords_and_short_tokens() {
        let keywords = extract_keywords("How do customers compare the pricing of handmade bags?");
        assert_eq!(keywords, vec!["customers", "handmade", "bags"]);
    }

    #[test]
    fn keywords_keep_hyphenated_terms() {
        let keywords = extract_keywords("eco-friendly packaging");
        assert_eq!(keywords, vec!["eco-friendly", "packaging"]);
    }

    #[test]
    fn queries_are_deduped_and_capped() {
        let config = RelevanceConfig::default();
        let queries = build_queries(
            &config,
            "Able",
            "https://ablecarry.com",
            "What do customers think about durability?",
        );
        assert_eq!(queries.len(), config.max_queries);
        let unique: std::collections::HashSet<&String> = queries.iter().collect();
        assert_eq!(unique.len(), queries.len());
        assert!(queries[0].starts_with("\"able carry\""));
    }

    #[test]
    fn unknown_brand_queries_use_the_brand_itself() {
        let config = RelevanceConfig::default();
        let queries = build_queries(&config, "Novel Goods", "", "durability of totes");
        assert!(queries.iter().all(|q| q.contains("\"novel goods\"")));
    }

    #[test]
    fn on_topic_requires_an_alias_mention() {
        let config = RelevanceConfig::default();
        assert!(is_on_topic(
            &config,
            &hit("Able Carry Daily backpack review", "", "Pack Hacker"),
            "Able",
        ));
        assert!(!is_on_topic(
            &config,
            &hit("Best EDC backpacks 2024", "no brand mention", "Pack Hacker"),
            "Able",
        ));
    }

    #[test]
    fn negative_keywords_reject_homonym_videos() {
        let config = RelevanceConfig::default();
        assert!(!is_on_topic(
            &config,
            &hit("Grand Seiko vs Soko Jewelry", "watch comparison", "WatchBox"),
            "Soko",
        ));
    }
}
