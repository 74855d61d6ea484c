//! Data models for search candidates and archived articles.
//!
//! - [`ArticleCandidate`]: article metadata as returned by the search API
//! - [`ArchiveEntry`]: the persisted unit, one JSON object per archive line
//! - [`Category`]: the fixed set of topical tags a run collects
//!
//! Archive field names are snake_case and must stay stable: older records in
//! the same file are read back by the export step.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topical tag attached to every archived article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Technology: AI, semiconductors, cloud, software.
    #[serde(rename = "IT")]
    It,
    /// Employment and the labor market.
    #[serde(rename = "취업")]
    Jobs,
}

impl Category {
    /// Every category a run collects, in processing order.
    pub const ALL: [Category; 2] = [Category::It, Category::Jobs];

    /// The label stored in the archive.
    pub fn label(&self) -> &'static str {
        match self {
            Category::It => "IT",
            Category::Jobs => "취업",
        }
    }

    /// Search query sent to the upstream API for this category.
    pub fn query(&self) -> &'static str {
        match self {
            Category::It => "(AI OR 반도체 OR 클라우드 OR 빅테크 OR IT OR 소프트웨어)",
            Category::Jobs => "(취업 OR 채용 OR 고용 OR 노동시장 OR 실업)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Article metadata from the search API. Never persisted as-is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCandidate {
    /// Headline; candidates without one are skipped.
    #[serde(default)]
    pub title: Option<String>,
    /// Canonical article URL; candidates without one are skipped.
    #[serde(default)]
    pub url: Option<String>,
    /// Short lead paragraph.
    #[serde(default)]
    pub description: Option<String>,
    /// Partial body; the search API truncates it with a `[+N chars]` marker.
    #[serde(default)]
    pub content: Option<String>,
    /// ISO-8601 publication time as reported upstream.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Lead image, stored as the entry's `thumbnail`.
    #[serde(default)]
    pub url_to_image: Option<String>,
}

/// One archived article. Created once, never rewritten.
///
/// `archived_at`, `article_published_at` and `source` are legacy names kept
/// populated so that readers of older archive lines keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// 16-hex-character content id, see [`crate::archive::make_id`].
    pub id: String,
    /// Sanitized headline.
    pub title: String,
    /// Bullet-formatted digest.
    pub summary: String,
    /// Text shown in a detail view.
    pub body: String,
    /// Structured short summary; never empty.
    pub ai_summary: String,
    /// Raw extracted page text, kept for reprocessing.
    pub scraped_body: String,
    /// Article URL as returned by the search API.
    pub url: String,
    pub category: Category,
    /// Lead image URL, empty when the source had none.
    #[serde(default)]
    pub thumbnail: String,
    /// Upstream publication time, verbatim.
    pub published_at: String,
    /// When this run processed the article, RFC 3339 in the configured offset.
    pub fetched_at: String,
    /// Legacy copy of `published_at`.
    pub article_published_at: String,
    /// Legacy copy of `fetched_at`.
    pub archived_at: String,
    /// Legacy provider name, always `"NewsAPI"`.
    pub source: String,
}
