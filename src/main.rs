//! # Brandscout CLI
//!
//! Command-line interface for the marketing research pipeline.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands for the two halves of the pipeline:
//!   - `crawl`: polite single-site crawl with summaries and marketing analysis
//!   - `comments`: YouTube comment relevance mining per competitor brand
//!
//! ## Features
//!
//! - Configurable crawl bounds, worker count, and pacing
//! - Per-brand question processing with progress tracking
//! - Fatal configuration errors (missing API keys, bad input files) reported
//!   once at startup
//! - JSON artifacts written to disk for downstream tooling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

use brandscout::artifacts::{
    AnalysisParameters, CommentAnalysis, CompetitorsFile, CrawlArtifact, FollowupMap, load_json,
    save_json,
};
use brandscout::crawler::CrawlerConfig;
use brandscout::relevance::{RelevanceConfig, RelevancePipeline};
use brandscout::retry::RetryPolicy;
use brandscout::summarize::{self, PageSummary, Summarizer};
use brandscout::youtube::YouTubeClient;

#[derive(Parser)]
#[command(author, version, about = "Marketing research crawler and YouTube comment miner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and save summarized content
    Crawl(CrawlArgs),

    /// Mine relevant YouTube comments for competitor brands
    Comments(CommentsArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// URL to crawl
    #[arg(required = true)]
    url: String,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long, default_value = "50")]
    max_pages: usize,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "2")]
    workers: usize,

    /// Minimum delay between requests to a host, in milliseconds
    #[arg(short = 'd', long, default_value = "2000")]
    min_delay: u64,

    /// Skip robots.txt compliance
    #[arg(long)]
    no_robots: bool,

    /// Use free-tier model quotas for summaries
    #[arg(long)]
    free_tier: bool,

    /// Output file path
    #[arg(short, long, default_value = "crawl_analysis.json")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct CommentsArgs {
    /// Path to the competitors JSON file
    #[arg(long, required = true)]
    competitors: PathBuf,

    /// Path to the follow-up questions JSON file
    #[arg(long, required = true)]
    followup: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "youtube_analysis.json")]
    output: PathBuf,

    /// Max videos per question
    #[arg(long, default_value = "5")]
    max_videos: usize,

    /// Max comments per video
    #[arg(long, default_value = "5")]
    max_comments: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Retries for transient errors
    #[arg(long, default_value = "3")]
    retries: u32,

    /// Minimum similarity for retained comments, 0 to 1
    #[arg(long, default_value = "0.25")]
    min_similarity: f64,

    /// Minimum words in a comment
    #[arg(long, default_value = "6")]
    min_words: usize,

    /// Minimum characters in a comment
    #[arg(long, default_value = "25")]
    min_chars: usize,

    /// Use free-tier model quotas for embeddings
    #[arg(long)]
    free_tier: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Crawl(args)) => crawl_command(args).await?,
        Some(Commands::Comments(args)) => comments_command(args).await?,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

#[instrument(skip(args), fields(url = %args.url))]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    println!("Crawling {}...", args.url);

    let config = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .max_workers(args.workers)
        .min_delay_ms(args.min_delay)
        .respect_robots_txt(!args.no_robots)
        .build();

    let report = brandscout::crawler::crawl_site(&args.url, config).await?;
    println!("Crawled {} pages", report.pages.len());

    // Summaries degrade to templates when no model is configured.
    let summarizer = match std::env::var("GEMINI_API_KEY") {
        Ok(_) => {
            let client = if args.free_tier {
                brandscout::model::Client::new_gemini_free_from_env()?
            } else {
                brandscout::model::Client::new_gemini_from_env()?
            };
            Some(Summarizer::new(client.completion().clone()))
        }
        Err(_) => {
            warn!("GEMINI_API_KEY not set, using template summaries");
            None
        }
    };

    let progress = ProgressBar::new(report.pages.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("progress template must parse")
            .progress_chars("##-"),
    );
    progress.set_message("Summarizing pages...");

    let mut page_summaries = Vec::with_capacity(report.pages.len());
    for page in &report.pages {
        let summary = match &summarizer {
            Some(s) => s.summarize_page(page).await,
            None => PageSummary {
                url: page.url.clone(),
                title: page.title.clone(),
                summary: summarize::content_preview(page),
                word_count: page.word_count,
            },
        };
        page_summaries.push(summary);
        progress.inc(1);
    }
    progress.finish_with_message("Summaries complete");

    let domain = report.domain.clone();
    let (site_summary, marketing_analysis) = match &summarizer {
        Some(s) => {
            let site = s.site_summary(&domain, &page_summaries).await;
            let marketing = s.marketing_analysis(&domain, &site, &page_summaries).await;
            (site, marketing)
        }
        None => (
            summarize::basic_site_summary(&domain, &page_summaries),
            summarize::basic_marketing_analysis(&domain, page_summaries.len()),
        ),
    };

    let stats = report.stats.clone();
    let artifact = CrawlArtifact::new(report, page_summaries, site_summary, marketing_analysis);
    save_json(&args.output, &artifact)?;

    println!(
        "Done: {} pages, {} requests, {} errors, {} URLs filtered -> {}",
        artifact.pages.len(),
        stats.requests_made,
        stats.errors_encountered,
        stats.urls_filtered,
        args.output.display()
    );
    Ok(())
}

#[instrument(skip(args))]
async fn comments_command(args: CommentsArgs) -> anyhow::Result<()> {
    let competitors: CompetitorsFile =
        load_json(&args.competitors).context("loading competitors file")?;
    let followups: FollowupMap = load_json(&args.followup).context("loading followup file")?;

    println!(
        "Config: {} competitors, {} questions, {} videos/question, {} comments/video",
        competitors.competitors.len(),
        followups.total_questions(),
        args.max_videos,
        args.max_comments
    );

    let retry = RetryPolicy::with_attempts(args.retries);
    let youtube = YouTubeClient::from_env(Duration::from_secs(args.timeout), retry)?;
    let gemini = if args.free_tier {
        brandscout::model::Client::new_gemini_free_from_env()?
    } else {
        brandscout::model::Client::new_gemini_from_env()?
    };

    let config = RelevanceConfig::builder()
        .min_similarity(args.min_similarity)
        .max_videos(args.max_videos)
        .max_comments(args.max_comments)
        .min_words(args.min_words)
        .min_chars(args.min_chars)
        .build();
    let pipeline = RelevancePipeline::new(youtube, gemini.embedding().clone(), config);

    let progress = ProgressBar::new(competitors.competitors.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("progress template must parse")
            .progress_chars("##-"),
    );
    progress.set_message("Processing competitors...");

    // Brands are independent units of work; run them concurrently.
    let jobs = competitors.competitors.iter().filter_map(|entry| {
        let brand = entry.brand.trim_matches('*').trim().to_string();
        let Some(questions) = followups.questions_for(&brand) else {
            warn!("no questions for brand: {}", brand);
            progress.inc(1);
            return None;
        };
        let website = entry.website.clone();
        let pipeline = &pipeline;
        let progress = &progress;
        Some(async move {
            let report = pipeline.process_competitor(&brand, &website, questions).await;
            progress.inc(1);
            report
        })
    });
    let competitors_data = futures::future::join_all(jobs).await;
    progress.finish_with_message("Competitors processed");

    let analysis = CommentAnalysis::new(
        AnalysisParameters {
            max_videos_per_question: args.max_videos,
            max_comments_per_video: args.max_comments,
            http_timeout_seconds: args.timeout,
            retries: args.retries,
            min_similarity: args.min_similarity,
            min_words: args.min_words,
            min_chars: args.min_chars,
        },
        competitors_data,
    );
    save_json(&args.output, &analysis)?;
    info!(
        competitors = analysis.total_competitors,
        videos = analysis.total_videos(),
        comments = analysis.total_comments(),
        "analysis complete"
    );

    println!(
        "Summary: {} competitors, {} videos, {} relevant comments -> {}",
        analysis.total_competitors,
        analysis.total_videos(),
        analysis.total_comments(),
        args.output.display()
    );
    Ok(())
}
