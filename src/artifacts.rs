//! Persisted JSON inputs and outputs
//!
//! Serde types for the files the CLI reads and writes: the competitors list,
//! the follow-up question map, the crawl artifact, and the comment analysis.
//! Malformed input is a validation error reported at load, before any network
//! work starts.

use std::collections::HashMap;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::crawler::{CrawlReport, CrawlStatsSnapshot, PageRecord};
use crate::error::{Error, Result};
use crate::relevance::CompetitorReport;
use crate::summarize::PageSummary;

/// One brand to research.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorEntry {
    pub brand: String,
    #[serde(default)]
    pub website: String,
}

/// Input file listing the competitors to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorsFile {
    pub competitors: Vec<CompetitorEntry>,
}

/// Input map of brand name to follow-up questions. Upstream tooling sometimes
/// emits keys wrapped in markdown bold markers, so lookups try both forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FollowupMap {
    pub questions: HashMap<String, Vec<String>>,
}

impl FollowupMap {
    pub fn questions_for(&self, brand: &str) -> Option<&Vec<String>> {
        self.questions
            .get(&format!("**{}**", brand))
            .or_else(|| self.questions.get(brand))
    }

    pub fn total_questions(&self) -> usize {
        self.questions.values().map(Vec::len).sum()
    }
}

/// Parameters echoed into the comment analysis so a reader can tell how the
/// numbers were produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParameters {
    pub max_videos_per_question: usize,
    pub max_comments_per_video: usize,
    pub http_timeout_seconds: u64,
    pub retries: u32,
    pub min_similarity: f64,
    pub min_words: usize,
    pub min_chars: usize,
}

/// Top-level output of the `comments` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAnalysis {
    pub scraping_timestamp: String,
    pub total_competitors: usize,
    pub parameters: AnalysisParameters,
    pub competitors_data: Vec<CompetitorReport>,
}

impl CommentAnalysis {
    pub fn new(parameters: AnalysisParameters, competitors_data: Vec<CompetitorReport>) -> Self {
        Self {
            scraping_timestamp: Local::now().to_rfc3339(),
            total_competitors: competitors_data.len(),
            parameters,
            competitors_data,
        }
    }

    pub fn total_videos(&self) -> usize {
        self.competitors_data
            .iter()
            .flat_map(|c| &c.results)
            .map(|q| q.videos.len())
            .sum()
    }

    pub fn total_comments(&self) -> usize {
        self.competitors_data
            .iter()
            .flat_map(|c| &c.results)
            .flat_map(|q| &q.videos)
            .map(|v| v.relevant_comments_count)
            .sum()
    }
}

/// Top-level output of the `crawl` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlArtifact {
    pub analysis_timestamp: String,
    pub base_url: String,
    pub domain: String,
    pub pages: Vec<PageRecord>,
    pub page_summaries: Vec<PageSummary>,
    pub site_summary: String,
    pub marketing_analysis: String,
    pub stats: CrawlStatsSnapshot,
}

impl CrawlArtifact {
    pub fn new(
        report: CrawlReport,
        page_summaries: Vec<PageSummary>,
        site_summary: String,
        marketing_analysis: String,
    ) -> Self {
        Self {
            analysis_timestamp: Local::now().to_rfc3339(),
            base_url: report.base_url,
            domain: report.domain,
            pages: report.pages,
            page_summaries,
            site_summary,
            marketing_analysis,
            stats: report.stats,
        }
    }
}

/// Load and validate a JSON input file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidInput(format!("invalid JSON in {}: {}", path.display(), e)))
}

/// Write a JSON artifact, pretty-printed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!("results saved to {}", path.display());
    Ok(())
}
