//! HTML link and content extraction
//!
//! Links are pulled from the raw document before any element stripping, then
//! the main content region is located via an ordered selector list (falling
//! back to the whole body) and reduced to cleaned line-based text.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::crawler::PageRecord;

/// Elements that never contribute body text
const STRIP_ELEMENTS: [&str; 9] = [
    "script", "style", "noscript", "iframe", "svg", "header", "nav", "footer", "aside",
];

/// Elements whose close implies a line break
const BLOCK_ELEMENTS: [&str; 12] = [
    "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "blockquote",
];

/// Structural selectors tried in order to locate the primary content region
const CONTENT_SELECTORS: [&str; 8] = [
    "main",
    "article",
    "[role=\"main\"]",
    ".main-content",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
];

/// Extract all outbound links from the raw document, resolved against
/// `base_url`. Must run before content stripping so links inside navigation
/// still feed the frontier.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href], area[href]").expect("link selector must parse");

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }
        if let Ok(resolved) = base_url.join(href) {
            links.push(resolved.to_string());
        }
    }
    links
}

/// Build a [`PageRecord`] from a fetched HTML document.
pub fn build_page_record(url: &str, html: &str) -> PageRecord {
    let base = Url::parse(url).ok();
    let links = base
        .as_ref()
        .map(|b| extract_links(html, b))
        .unwrap_or_default();

    let document = Html::parse_document(html);
    let title = extract_title(&document);
    let content = extract_content(&document);
    let word_count = content.split_whitespace().count();

    PageRecord {
        url: url.to_string(),
        title,
        content,
        links,
        word_count,
    }
}

fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").expect("title selector must parse");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No Title".to_string())
}

fn extract_content(document: &Html) -> String {
    let region = CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|s| document.select(&s).next())
        });

    let mut raw = String::new();
    match region {
        Some(element) => collect_text(element, &mut raw),
        None => collect_text(document.root_element(), &mut raw),
    }

    clean_lines(&raw)
}

/// Walk the element tree collecting text, skipping non-content elements and
/// turning line-break and block boundaries into newlines.
fn collect_text(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if STRIP_ELEMENTS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }

    if BLOCK_ELEMENTS.contains(&name) {
        out.push('\n');
    }
}

/// Drop trivially short and pure-numeric lines.
fn clean_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.len() > 3 && !line.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html>
          <head><title> Acme Bags </title><script>var x = 1;</script></head>
          <body>
            <nav><a href="/about">About</a></nav>
            <main>
              <h1>Durable totes</h1>
              <p>Hand stitched leather.<br>Built to last.</p>
              <p>42</p>
              <p>ok</p>
            </main>
            <footer>Copyright 2024</footer>
            <a href="/blog/launch">Launch post</a>
            <a href="#top">Top</a>
            <a href="mailto:hi@acme.test">Mail</a>
            <a href="https://other.test/page">Elsewhere</a>
          </body>
        </html>
    "##;

    #[test]
    fn links_are_extracted_before_stripping() {
        let base = Url::parse("https://acme.test/").unwrap();
        let links = extract_links(PAGE, &base);

        // nav link survives even though <nav> is stripped from content
        assert!(links.contains(&"https://acme.test/about".to_string()));
        assert!(links.contains(&"https://acme.test/blog/launch".to_string()));
        assert!(links.contains(&"https://other.test/page".to_string()));
        // fragment-only and mailto links are dropped
        assert!(!links.iter().any(|l| l.contains('#') || l.starts_with("mailto:")));
    }

    #[test]
    fn content_comes_from_main_region_only() {
        let record = build_page_record("https://acme.test/", PAGE);

        assert_eq!(record.title, "Acme Bags");
        assert!(record.content.contains("Durable totes"));
        assert!(record.content.contains("Hand stitched leather."));
        // br became a line break
        assert!(record.content.contains("Built to last."));
        // nav and footer text excluded
        assert!(!record.content.contains("About"));
        assert!(!record.content.contains("Copyright"));
        // pure-numeric and trivially short lines dropped
        assert!(!record.content.contains("42"));
        assert!(!record.content.lines().any(|l| l == "ok"));
    }

    #[test]
    fn falls_back_to_body_without_structural_region() {
        let html = "<html><body><p>Just a paragraph of text here.</p></body></html>";
        let record = build_page_record("https://acme.test/", html);
        assert!(record.content.contains("Just a paragraph"));
        assert_eq!(record.word_count, 6);
    }

    #[test]
    fn script_text_never_leaks_into_content() {
        let html = "<html><body><main><p>Real text content.</p>\
                    <script>secretTrackingCall();</script></main></body></html>";
        let record = build_page_record("https://acme.test/", html);
        assert!(!record.content.contains("secretTrackingCall"));
    }
}
