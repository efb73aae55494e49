//! Page and site summarization
//!
//! Wraps a completion model behind summary operations that never fail: every
//! LLM path has a deterministic template fallback, so a quota blip or a
//! missing API key degrades the output instead of aborting a crawl that
//! already did the expensive fetching.

use chrono::Local;
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::crawler::PageRecord;

/// Per-page content sent to the model, in characters
const PAGE_CONTENT_LIMIT: usize = 4000;

/// Page summaries included in the whole-site prompt
const SITE_SUMMARY_PAGE_CAP: usize = 25;

/// Page summaries included in the marketing analysis prompt
const ANALYSIS_PAGE_CAP: usize = 15;

/// A summarized page, kept alongside the raw record in the crawl artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub word_count: usize,
}

/// Summarizer over any `rig` completion model.
#[derive(Clone)]
pub struct Summarizer<C: CompletionModel> {
    model: C,
}

impl<C: CompletionModel> Summarizer<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }

    fn agent(&self, preamble: &str) -> rig::agent::Agent<C> {
        AgentBuilder::new(self.model.clone())
            .preamble(preamble)
            .build()
    }

    /// Summarize one page. Falls back to a content preview on any model
    /// failure.
    #[instrument(skip_all, fields(url = %page.url))]
    pub async fn summarize_page(&self, page: &PageRecord) -> PageSummary {
        let content = truncate_chars(&page.content, PAGE_CONTENT_LIMIT);
        let prompt = format!(
            "Title: {}\nURL: {}\n\nContent:\n{}",
            page.title, page.url, content
        );
        let agent = self.agent("Create a concise, informative summary of this webpage content.");

        let summary = match agent.prompt(prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!("page summary failed, using preview: {}", err);
                content_preview(page)
            }
        };

        PageSummary {
            url: page.url.clone(),
            title: page.title.clone(),
            summary,
            word_count: page.word_count,
        }
    }

    /// Whole-site summary from the individual page summaries. Falls back to
    /// the page inventory.
    #[instrument(skip_all, fields(pages = summaries.len()))]
    pub async fn site_summary(&self, domain: &str, summaries: &[PageSummary]) -> String {
        let combined = summaries
            .iter()
            .take(SITE_SUMMARY_PAGE_CAP)
            .enumerate()
            .map(|(i, s)| {
                format!(
                    "Page {}: {}\nURL: {}\nSummary: {}...",
                    i + 1,
                    s.title,
                    s.url,
                    truncate_chars(&s.summary, 300)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Create a comprehensive final summary of this website based on the \
             individual page summaries below.\n\n\
             Website: {}\nTotal Pages Analyzed: {}\n\n\
             Page Summaries:\n{}\n\n\
             Create a structured final summary with:\n\n\
             1. **Website Overview**: What is this website about and its main purpose?\n\
             2. **Key Topics & Content**: What are the main themes and subject areas covered?\n\
             3. **Important Information**: Significant facts, data, products, or services mentioned.\n\
             4. **Target Audience**: Who is this website intended for?\n\
             5. **Structure & Navigation**: How the content is organized.\n\
             6. **Overall Assessment**: What type of website this is and its primary value proposition.",
            domain,
            summaries.len(),
            combined
        );
        let agent = self.agent(
            "You are an expert at analyzing websites and creating comprehensive \
             summaries from multiple page analyses.",
        );

        match agent.prompt(prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!("site summary failed, using page inventory: {}", err);
                basic_site_summary(domain, summaries)
            }
        }
    }

    /// Marketing-focused breakdown built on top of the site summary. Falls
    /// back to a manual-review template.
    #[instrument(skip_all)]
    pub async fn marketing_analysis(
        &self,
        domain: &str,
        site_summary: &str,
        summaries: &[PageSummary],
    ) -> String {
        let mut content = format!("Final Summary:\n{}\n\nIndividual Page Summaries:\n", site_summary);
        for s in summaries.iter().take(ANALYSIS_PAGE_CAP) {
            content.push_str(&format!(
                "\n- {}: {}...",
                s.title,
                truncate_chars(&s.summary, 200)
            ));
        }

        let prompt = format!(
            "You are a meticulous marketing strategist analyzing a website for sales \
             page creation. Based on the website content below, provide a detailed, \
             structured breakdown in the EXACT format requested.\n\n\
             Rules:\n\
             - Use actual phrases, copy, and claims from the site where possible.\n\
             - If any section lacks clear info, write \"Not found in analysis\". Do not invent.\n\
             - Each section should be detailed, not one-liners.\n\n\
             Website being analyzed: {}\n\n\
             Website Content for Analysis:\n{}\n\n\
             Structure your output in this exact format, answering each section \
             thoroughly and separately:\n\n\
             1. **Elevator Pitch / One-liner**: a concise sentence in the form \
             \"We help [target customer] do [job/result] using [product/service].\"\n\
             2. **Core Product/Service Description**: offering type, target user, major \
             features, pricing or tiers, guarantees or trials.\n\
             3. **The Problem It Solves**: pain points mentioned or implied, quoting exact \
             problem statements where possible.\n\
             4. **The Transformation / Outcome**: practical and emotional transformation, \
             using phrases from testimonials or benefit copy.\n\
             5. **Proof & Credibility**: testimonials, reviews, case studies, user counts, \
             media mentions, client logos.\n\
             6. **Unique Selling Points / Differentiators**: what makes this offer different.\n\
             7. **Target Customer Profile**: demographics, roles, business type, B2B or B2C.\n\
             8. **Objection Killers**: FAQ content, guarantees, urgency, money-back claims.\n\
             9. **First User Experience**: what happens immediately after signup or purchase.\n\
             10. **Bonus Emotional Gold**: the emotional desire or aspiration the product \
             taps into, beliefs challenged, fear of missing out.\n\n\
             Format the output cleanly with headers and bullet points. Never guess; only \
             extract what is clearly present.",
            domain, content
        );
        let agent = self.agent(
            "You are an expert marketing analyst who creates detailed breakdowns of \
             business websites for competitive analysis and copywriting insights.",
        );

        match agent.prompt(prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!("marketing analysis failed, using template: {}", err);
                basic_marketing_analysis(domain, summaries.len())
            }
        }
    }
}

/// Summary used when no model is configured or a page summary fails.
pub fn content_preview(page: &PageRecord) -> String {
    format!(
        "Content preview:\n{}...",
        truncate_chars(&page.content, 300)
    )
}

/// Deterministic page inventory used when the site summary cannot be
/// generated.
pub fn basic_site_summary(domain: &str, summaries: &[PageSummary]) -> String {
    let total_words: usize = summaries.iter().map(|s| s.word_count).sum();
    let mut out = format!(
        "# Website Analysis: {}\n\n\
         **Analysis Date:** {}\n\
         **Pages Analyzed:** {}\n\
         **Total Word Count:** {}\n\n\
         ## Website Overview\n\
         This analysis covers {} pages from {}, containing approximately {} words of content.\n\n\
         ## Pages Analyzed:\n",
        domain,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        summaries.len(),
        total_words,
        summaries.len(),
        domain,
        total_words
    );
    for (i, s) in summaries.iter().enumerate() {
        out.push_str(&format!(
            "\n### {}. {}\n**URL:** {}\n**Word Count:** {}\n**Summary:** {}\n",
            i + 1,
            s.title,
            s.url,
            s.word_count,
            truncate_chars(&s.summary, 200)
        ));
    }
    out
}

/// Deterministic marketing template used when the analysis cannot be
/// generated.
pub fn basic_marketing_analysis(domain: &str, pages_analyzed: usize) -> String {
    format!(
        "# Marketing Analysis: {}\n\n\
         **Analysis Date:** {}\n\
         **Pages Analyzed:** {}\n\n\
         Automated analysis was unavailable for this run. The sections below \
         require manual review of the saved page summaries.\n\n\
         1. Elevator Pitch / One-liner\n\
         2. Core Product/Service Description\n\
         3. The Problem It Solves\n\
         4. The Transformation / Outcome\n\
         5. Proof & Credibility\n\
         6. Unique Selling Points / Differentiators\n\
         7. Target Customer Profile\n\
         8. Objection Killers\n\
         9. First User Experience\n\
         10. Bonus Emotional Gold\n",
        domain,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        pages_analyzed
    )
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;

    fn page() -> PageRecord {
        PageRecord {
            url: "https://site.test/about".to_string(),
            title: "About".to_string(),
            content: "We make durable leather bags by hand.".to_string(),
            links: Vec::new(),
            word_count: 7,
        }
    }

    #[tokio::test]
    async fn page_summary_uses_the_model_response() {
        let model = MockCompletionModel::new();
        model.set_text_response("A maker of handmade leather bags.").await;
        let summarizer = Summarizer::new(model);

        let summary = summarizer.summarize_page(&page()).await;
        assert_eq!(summary.summary, "A maker of handmade leather bags.");
        assert_eq!(summary.url, "https://site.test/about");
        assert_eq!(summary.word_count, 7);
    }

    #[tokio::test]
    async fn page_summary_falls_back_on_model_failure() {
        let model = MockCompletionModel::new();
        model.set_failing().await;
        let summarizer = Summarizer::new(model);

        let summary = summarizer.summarize_page(&page()).await;
        assert!(summary.summary.starts_with("Content preview:"));
        assert!(summary.summary.contains("durable leather bags"));
    }

    #[tokio::test]
    async fn site_summary_falls_back_to_inventory() {
        let model = MockCompletionModel::new();
        model.set_failing().await;
        let summarizer = Summarizer::new(model);

        let summaries = vec![PageSummary {
            url: "https://site.test/".to_string(),
            title: "Home".to_string(),
            summary: "Landing page.".to_string(),
            word_count: 120,
        }];
        let out = summarizer.site_summary("site.test", &summaries).await;
        assert!(out.contains("# Website Analysis: site.test"));
        assert!(out.contains("### 1. Home"));
    }

    #[test]
    fn basic_marketing_analysis_names_every_section() {
        let out = basic_marketing_analysis("site.test", 3);
        assert!(out.contains("Elevator Pitch"));
        assert!(out.contains("Bonus Emotional Gold"));
        assert!(out.contains("**Pages Analyzed:** 3"));
    }
}
