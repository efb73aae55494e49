//! URL validation, prioritization, and normalization
//!
//! Every discovered link passes through [`UrlValidator`] before it can enter
//! the frontier. Validation rejects off-domain and non-content URLs outright;
//! prioritization scores the survivors so content-like paths are crawled
//! first; normalization reduces each URL to a canonical form used for
//! visited-tracking, so two spellings of the same page are fetched once.

use regex::RegexSet;
use url::Url;

/// Longest URL worth considering at all
const MAX_URL_LEN: usize = 2000;

/// Query strings longer than this are almost always tracking or filter state
const MAX_QUERY_LEN: usize = 200;

/// Paths deeper than this rarely hold primary content
const MAX_PATH_DEPTH: usize = 6;

/// Query parameters that survive normalization; everything else is dropped
const KEPT_QUERY_PARAMS: [&str; 6] = ["id", "page", "category", "tag", "slug", "section"];

/// Patterns for URLs that are definitely not content
const DENY_PATTERNS: [&str; 17] = [
    // CDN internals
    r"/cdn-cgi/",
    // static assets and binary documents
    r"\.(?:css|js|ico|png|jpg|jpeg|gif|svg|woff|woff2|ttf|eot)$",
    r"\.(?:pdf|doc|docx|xls|xlsx|zip|rar|mp4|mp3|avi|mov)$",
    r"\.json$",
    r"\.xml$",
    r"\.txt$",
    // admin and build output
    r"/wp-admin/",
    r"/wp-content/uploads/",
    r"/admin/",
    r"/_next/static/",
    r"/static/",
    r"/assets/",
    r"/\.well-known/",
    // tracking and analytics hosts that sneak into hrefs
    r"google-analytics|googletagmanager|doubleclick\.net|facebook\.net",
    r"facebook\.com|twitter\.com|linkedin\.com|instagram\.com|youtube\.com",
    // feeds, sitemaps, on-site search
    r"/search\?|\?utm_",
    r"/feed/?$|/rss/?$|/sitemap",
];

/// Path patterns that usually lead to real content
const ALLOW_PATTERNS: [&str; 15] = [
    r"/blog/",
    r"/article/",
    r"/post/",
    r"/news/",
    r"/about/",
    r"/contact/",
    r"/service/",
    r"/product/",
    r"/pricing/",
    r"/feature/",
    r"/help/",
    r"/support/",
    r"/docs/",
    r"/guide/",
    r"/tutorial/",
];

/// Validates, scores, and canonicalizes URLs against one crawl's base domain.
#[derive(Debug)]
pub struct UrlValidator {
    base_domain: String,
    deny: RegexSet,
    allow: RegexSet,
}

impl UrlValidator {
    /// Create a validator for the given base domain. A leading `www.` is
    /// ignored when comparing domains.
    pub fn new(base_domain: &str) -> Self {
        Self {
            base_domain: strip_www(base_domain).to_lowercase(),
            deny: RegexSet::new(DENY_PATTERNS).expect("deny patterns must compile"),
            allow: RegexSet::new(ALLOW_PATTERNS).expect("allow patterns must compile"),
        }
    }

    /// Whether this URL is worth fetching at all.
    pub fn is_valid(&self, url: &Url) -> bool {
        if url.as_str().len() > MAX_URL_LEN {
            return false;
        }

        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        if strip_www(host).to_lowercase() != self.base_domain {
            return false;
        }

        if self.deny.is_match(&url.as_str().to_lowercase()) {
            return false;
        }

        if url.query().map_or(0, str::len) > MAX_QUERY_LEN {
            return false;
        }

        if path_depth(url) > MAX_PATH_DEPTH {
            return false;
        }

        true
    }

    /// Priority score for queue placement; higher means better content odds.
    pub fn priority(&self, url: &Url) -> u32 {
        let mut priority = 0u32;

        let lowered = url.as_str().to_lowercase();
        priority += 10 * self.allow.matches(&lowered).iter().count() as u32;

        // shorter paths are usually main pages
        priority += 5u32.saturating_sub(path_depth(url) as u32);

        if url.query().is_none_or(str::is_empty) {
            priority += 2;
        }

        priority
    }

    /// Canonical form used for visited-tracking. Strips the fragment, trims a
    /// trailing slash (an empty path becomes `/`), and keeps only the query
    /// parameters that distinguish pages. Idempotent.
    pub fn normalize(&self, url: &Url) -> String {
        let mut path = url.path().trim_end_matches('/').to_string();
        if path.is_empty() {
            path = "/".to_string();
        }

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, value)| {
                !value.is_empty() && KEPT_QUERY_PARAMS.contains(&key.to_lowercase().as_str())
            })
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let authority = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        if kept.is_empty() {
            format!("{}://{}{}", url.scheme(), authority, path)
        } else {
            let query = kept
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}://{}{}?{}", url.scheme(), authority, path, query)
        }
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn path_depth(url: &Url) -> usize {
    url.path().split('/').filter(|s| !s.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UrlValidator {
        UrlValidator::new("example.com")
    }

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn rejects_cross_domain() {
        let v = validator();
        assert!(!v.is_valid(&parse("https://other.com/page")));
        assert!(v.is_valid(&parse("https://example.com/page")));
        assert!(v.is_valid(&parse("https://www.example.com/page")));
    }

    #[test]
    fn rejects_non_http_schemes() {
        let v = validator();
        assert!(!v.is_valid(&parse("ftp://example.com/file")));
        assert!(!v.is_valid(&parse("mailto:hello@example.com")));
    }

    #[test]
    fn rejects_static_assets_and_documents() {
        let v = validator();
        assert!(!v.is_valid(&parse("https://example.com/logo.png")));
        assert!(!v.is_valid(&parse("https://example.com/report.pdf")));
        assert!(!v.is_valid(&parse("https://example.com/app.js")));
        assert!(!v.is_valid(&parse("https://example.com/wp-admin/login")));
    }

    #[test]
    fn rejects_tracking_and_deep_paths() {
        let v = validator();
        assert!(!v.is_valid(&parse("https://example.com/page?utm_source=news")));
        assert!(!v.is_valid(&parse("https://example.com/a/b/c/d/e/f/g")));
        let long_query = format!("https://example.com/page?q={}", "x".repeat(300));
        assert!(!v.is_valid(&parse(&long_query)));
    }

    #[test]
    fn content_paths_score_higher() {
        let v = validator();
        let blog = v.priority(&parse("https://example.com/blog/launch"));
        let misc = v.priority(&parse("https://example.com/x/y/z/w"));
        assert!(blog > misc);
    }

    #[test]
    fn no_query_gets_bonus() {
        let v = validator();
        let clean = v.priority(&parse("https://example.com/pricing/"));
        let with_query = v.priority(&parse("https://example.com/pricing/?ref=nav"));
        assert_eq!(clean, with_query + 2);
    }

    #[test]
    fn normalize_strips_fragment_and_tracking_params() {
        let v = validator();
        let normalized =
            v.normalize(&parse("https://example.com/post/?utm_campaign=x&id=7#section"));
        assert_eq!(normalized, "https://example.com/post?id=7");
    }

    #[test]
    fn normalize_collapses_empty_path() {
        let v = validator();
        assert_eq!(v.normalize(&parse("https://example.com")), "https://example.com/");
        assert_eq!(v.normalize(&parse("https://example.com/")), "https://example.com/");
    }

    #[test]
    fn normalize_is_idempotent() {
        let v = validator();
        let inputs = [
            "https://example.com/post/?id=7&utm_source=mail#top",
            "https://example.com/",
            "https://example.com/a/b?page=2",
            "https://example.com:8080/shop/?category=bags&ref=x",
        ];
        for input in inputs {
            let once = v.normalize(&parse(input));
            let twice = v.normalize(&parse(&once));
            assert_eq!(once, twice, "normalize not idempotent for {}", input);
        }
    }
}
