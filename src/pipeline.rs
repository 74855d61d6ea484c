//! One archive update run.
//!
//! For each category: search → dedup candidates → per article (fetch page →
//! extract → filter → sanitize → summarize) → append the category's batch.
//! Every per-article stage degrades instead of failing, so each selected
//! candidate yields exactly one complete [`ArchiveEntry`]. Only archive I/O
//! errors abort the run.

use crate::api::{AskAsync, ResponsesClient};
use crate::archive::{make_id, ArchiveWriter};
use crate::config::PipelineConfig;
use crate::error::{ArchiveError, FetchError};
use crate::extract::Extractor;
use crate::fetcher::{DateRange, NewsApiClient, PageFetcher};
use crate::models::{ArchiveEntry, ArticleCandidate, Category};
use crate::noise::NoiseFilter;
use crate::sanitize::{clean_text, sanitize, FieldKind};
use crate::summarizer::{ArticleText, Summarizer, UNSUMMARIZABLE};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Recorded in the legacy `source` field.
const SOURCE_NAME: &str = "NewsAPI";

/// Outcome of one category within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,
    /// Candidates selected after dedup and the item limit.
    pub candidates: usize,
    /// New lines appended to the archive.
    pub added: usize,
}

/// Outcome of a whole `update` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub archive: PathBuf,
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    /// New archive lines across all categories.
    pub fn added(&self) -> usize {
        self.categories.iter().map(|c| c.added).sum()
    }

    /// Selected candidates for `category`, 0 if it did not run.
    pub fn candidates(&self, category: Category) -> usize {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.candidates)
    }
}

/// Search, extraction, summarization and archiving for one update run.
///
/// `R` is the reasoning client; tests plug in a scripted stub.
pub struct Pipeline<R> {
    search: NewsApiClient,
    pages: PageFetcher,
    extractor: Extractor,
    noise: NoiseFilter,
    summarizer: Summarizer<R>,
    archive: ArchiveWriter,
    item_limit: usize,
    concurrency: usize,
}

impl Pipeline<ResponsesClient> {
    /// Build every component from the resolved configuration. The reasoning
    /// client exists only when a credential was configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, Box<dyn Error>> {
        let reasoner = config
            .reasoning
            .as_ref()
            .map(ResponsesClient::new)
            .transpose()?;
        if let Some(client) = &reasoner {
            info!(model = client.model(), "Reasoning service enabled");
        }
        Ok(Pipeline::new(config, reasoner)?)
    }
}

impl<R: AskAsync> Pipeline<R> {
    /// # Arguments
    ///
    /// * `config` - Resolved run configuration
    /// * `reasoner` - Reasoning client, or `None` for local summaries only
    ///
    /// # Returns
    ///
    /// `FetchError::Network` if an HTTP client cannot be built.
    pub fn new(config: &PipelineConfig, reasoner: Option<R>) -> Result<Self, FetchError> {
        let noise = NoiseFilter::new(config.noise.clone());
        Ok(Self {
            search: NewsApiClient::new(
                config.search.clone(),
                &config.user_agent,
                config.max_fetch_attempts,
            )?,
            pages: PageFetcher::new(
                config.page_timeout,
                &config.user_agent,
                config.max_fetch_attempts,
            )?,
            extractor: Extractor::new(config.extract.clone(), noise.clone()),
            noise,
            summarizer: Summarizer::new(reasoner, config.max_summary_lines),
            archive: ArchiveWriter::new(config.archive_path.clone()),
            item_limit: config.item_limit_per_category,
            concurrency: config.concurrency.max(1),
        })
    }

    /// Run every category for the date window ending at `now`.
    #[instrument(level = "info", skip_all, fields(archive = %self.archive.path().display()))]
    pub async fn run(&self, now: DateTime<FixedOffset>) -> Result<RunReport, ArchiveError> {
        let range = DateRange::ending_on(now);
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            categories.push(self.run_category(category, &range, now).await?);
        }
        let report = RunReport {
            archive: self.archive.path().to_path_buf(),
            categories,
        };
        info!(
            archive = %report.archive.display(),
            added = report.added(),
            it_candidates = report.candidates(Category::It),
            job_candidates = report.candidates(Category::Jobs),
            "OK"
        );
        Ok(report)
    }

    #[instrument(level = "info", skip_all, fields(%category))]
    async fn run_category(
        &self,
        category: Category,
        range: &DateRange,
        now: DateTime<FixedOffset>,
    ) -> Result<CategoryReport, ArchiveError> {
        let found = self.search.fetch_all_pages(range, category.query()).await;
        let selected = unique_articles(found, self.item_limit);
        info!(selected = selected.len(), "Selected candidates");

        let fetched_at = now.to_rfc3339_opts(SecondsFormat::Secs, false);
        let entries: Vec<ArchiveEntry> = stream::iter(selected.iter())
            .map(|candidate| self.process_article(candidate, category, &fetched_at))
            .buffered(self.concurrency)
            .collect()
            .await;

        let added = self.archive.append_entries(&entries).await?;
        Ok(CategoryReport {
            category,
            candidates: selected.len(),
            added,
        })
    }

    /// Turn one candidate into a complete archive entry. Never fails: an
    /// unreachable page means empty extraction, a failed reasoning call
    /// means local summaries.
    #[instrument(level = "info", skip_all, fields(url = candidate.url.as_deref().unwrap_or("")))]
    pub async fn process_article(
        &self,
        candidate: &ArticleCandidate,
        category: Category,
        fetched_at: &str,
    ) -> ArchiveEntry {
        let title = candidate_text(candidate.title.as_deref(), FieldKind::Title);
        let description = candidate_text(candidate.description.as_deref(), FieldKind::Body);
        let content = candidate_text(candidate.content.as_deref(), FieldKind::Body);
        let url = sanitize(candidate.url.as_deref(), FieldKind::Url);
        let published_at = sanitize(candidate.published_at.as_deref(), FieldKind::Timestamp);

        let scraped_body = match self.pages.fetch_raw_html(&url).await {
            Some(page) => sanitize(
                Some(&self.extractor.extract_bytes(&page.bytes, page.charset.as_deref())),
                FieldKind::Body,
            ),
            None => String::new(),
        };
        let lines: Vec<String> = scraped_body.lines().map(str::to_string).collect();
        let filtered = self.noise.filter_paragraphs(&lines).join("\n");
        debug!(
            scraped_chars = scraped_body.chars().count(),
            filtered_chars = filtered.chars().count(),
            "Extracted article body"
        );

        let article = ArticleText {
            title: &title,
            description: &description,
            body: if filtered.is_empty() { &content } else { &filtered },
        };
        let bullets = self.summarizer.bullet_summary(&article).await;

        let structured_source = [filtered.as_str(), description.as_str(), content.as_str(), title.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("");
        let structured = self
            .summarizer
            .structured_summary(&title, structured_source)
            .await;

        let summary = sanitize(Some(&bullets.text), FieldKind::Summary);
        let body = choose_body(&filtered, &summary, &description);
        let ai_summary = match sanitize(Some(&structured.text), FieldKind::Summary) {
            s if s.is_empty() => UNSUMMARIZABLE.to_string(),
            s => s,
        };
        info!(
            summary_source = ?bullets.source,
            structured = ?structured.kind,
            "Processed article"
        );

        ArchiveEntry {
            id: make_id(&url, &title, &published_at),
            title,
            summary,
            body: sanitize(Some(&body), FieldKind::Body),
            ai_summary,
            scraped_body,
            url,
            category,
            thumbnail: sanitize(candidate.url_to_image.as_deref(), FieldKind::Thumbnail),
            article_published_at: published_at.clone(),
            published_at,
            fetched_at: fetched_at.to_string(),
            archived_at: fetched_at.to_string(),
            source: SOURCE_NAME.to_string(),
        }
    }
}

/// Sanitize then apply the search-field cleanup.
fn candidate_text(raw: Option<&str>, kind: FieldKind) -> String {
    clean_text(&sanitize(raw, kind))
}

/// Detail-view text: filtered extraction, else the bullet summary, else the
/// description.
fn choose_body(filtered: &str, summary: &str, description: &str) -> String {
    [filtered, summary, description]
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("")
        .to_string()
}

/// Keep candidates with a title and URL, first occurrence per
/// case-insensitive title, at most `limit`.
pub fn unique_articles(candidates: Vec<ArticleCandidate>, limit: usize) -> Vec<ArticleCandidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let has_title = !clean_text(c.title.as_deref().unwrap_or("")).is_empty();
            let has_url = c.url.as_deref().is_some_and(|u| !u.trim().is_empty());
            has_title && has_url
        })
        .unique_by(|c| clean_text(c.title.as_deref().unwrap_or("")).to_lowercase())
        .take(limit)
        .collect()
}
