//! Resolved, immutable configuration for the pipeline and the export step.
//!
//! Values come from three layers, highest precedence first:
//! 1. command-line flags / environment variables ([`crate::cli`])
//! 2. the optional YAML settings file (`--config`)
//! 3. built-in defaults
//!
//! The result is a plain value handed to each component's constructor.

use crate::cli::{ExportArgs, UpdateArgs};
use crate::error::ConfigError;
use crate::extract::{ExtractOptions, Strategy};
use crate::noise::NoiseConfig;
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2/";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_ARCHIVE_PATH: &str = "data/news_archive.jsonl";
pub const DEFAULT_EXPORT_PATH: &str = "docs/data/news_archive.json";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
const DEFAULT_MAX_SUMMARY_LINES: usize = 15;
const DEFAULT_ITEM_LIMIT: usize = 8;
const DEFAULT_PAGE_SIZE: usize = 12;
const DEFAULT_MAX_PAGES: usize = 3;
const DEFAULT_EXPORT_MAX_LINES: usize = 24;
const MAX_FETCH_ATTEMPTS: usize = 3;
const USER_AGENT: &str = "news-archive-bot/1.0";

/// Contents of the optional YAML settings file. Credentials are not read
/// from here; they only come from flags or the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub newsapi_base_url: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub utc_offset_hours: Option<i32>,
    pub max_summary_lines: Option<usize>,
    pub archive_path: Option<PathBuf>,
    pub item_limit_per_category: Option<usize>,
    pub page_size: Option<usize>,
    pub max_pages: Option<usize>,
    pub concurrency: Option<usize>,
    pub extraction_order: Option<Vec<Strategy>>,
    pub max_extracted_chars: Option<usize>,
    pub min_paragraph_chars: Option<usize>,
    pub export_source: Option<PathBuf>,
    pub export_output: Option<PathBuf>,
    pub export_max_lines: Option<usize>,
}

impl Settings {
    /// Load the settings file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Search API settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// `NEWSAPI_KEY`; never blank.
    pub api_key: String,
    pub base_url: String,
    /// Article language filter, `ko`.
    pub language: String,
    /// Results per page, 1..=100.
    pub page_size: usize,
    /// Pages fetched per category at most.
    pub max_pages: usize,
    pub timeout: Duration,
}

/// Reasoning-service settings; present only when `OPENAI_API_KEY` is set.
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Everything an `update` run needs, resolved once and passed down.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub search: SearchConfig,
    /// `None` disables every external reasoning stage.
    pub reasoning: Option<ReasoningConfig>,
    pub page_timeout: Duration,
    pub max_fetch_attempts: usize,
    pub user_agent: String,
    pub utc_offset: FixedOffset,
    pub max_summary_lines: usize,
    pub item_limit_per_category: usize,
    pub archive_path: PathBuf,
    pub concurrency: usize,
    pub extract: ExtractOptions,
    pub noise: NoiseConfig,
}

impl PipelineConfig {
    /// Merge CLI/env values over the settings file over defaults.
    ///
    /// # Returns
    ///
    /// `ConfigError::MissingCredential` without a search API key, and
    /// `ConfigError::Invalid` for an out-of-range offset, page size or an
    /// empty strategy list.
    pub fn resolve(args: &UpdateArgs, settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = non_blank(args.newsapi_key.as_deref())
            .ok_or(ConfigError::MissingCredential("NEWSAPI_KEY"))?;

        let reasoning = non_blank(args.openai_api_key.as_deref()).map(|api_key| ReasoningConfig {
            api_key,
            model: non_blank(args.openai_model.as_deref())
                .or_else(|| settings.openai_model.clone())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: args
                .openai_base_url
                .clone()
                .or_else(|| settings.openai_base_url.clone())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            timeout: Duration::from_secs(30),
        });
        if reasoning.is_none() {
            info!("OPENAI_API_KEY not set; summaries will be built locally");
        }

        let offset_hours = args
            .utc_offset_hours
            .or(settings.utc_offset_hours)
            .unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            ConfigError::Invalid {
                field: "UTC_OFFSET_HOURS",
                reason: format!("{offset_hours} is out of range"),
            }
        })?;

        let page_size = args
            .page_size
            .or(settings.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=100).contains(&page_size) {
            return Err(ConfigError::Invalid {
                field: "NEWS_PAGE_SIZE",
                reason: format!("{page_size} must be between 1 and 100"),
            });
        }

        let mut extract = ExtractOptions::default();
        if let Some(order) = settings.extraction_order.clone() {
            if order.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "extraction_order",
                    reason: "at least one strategy is required".to_string(),
                });
            }
            extract.strategy_order = order;
        }
        if let Some(max_chars) = settings.max_extracted_chars {
            extract.max_chars = max_chars.max(1);
        }

        let mut noise = NoiseConfig::default();
        if let Some(min_chars) = settings.min_paragraph_chars {
            noise.min_chars = min_chars;
        }

        let config = PipelineConfig {
            search: SearchConfig {
                api_key,
                base_url: args
                    .newsapi_base_url
                    .clone()
                    .or_else(|| settings.newsapi_base_url.clone())
                    .unwrap_or_else(|| DEFAULT_NEWSAPI_BASE_URL.to_string()),
                language: "ko".to_string(),
                page_size,
                max_pages: args.max_pages.or(settings.max_pages).unwrap_or(DEFAULT_MAX_PAGES).max(1),
                timeout: Duration::from_secs(20),
            },
            reasoning,
            page_timeout: Duration::from_secs(15),
            max_fetch_attempts: MAX_FETCH_ATTEMPTS,
            user_agent: USER_AGENT.to_string(),
            utc_offset,
            max_summary_lines: args
                .max_summary_lines
                .or(settings.max_summary_lines)
                .unwrap_or(DEFAULT_MAX_SUMMARY_LINES)
                .max(1),
            item_limit_per_category: args
                .item_limit_per_category
                .or(settings.item_limit_per_category)
                .unwrap_or(DEFAULT_ITEM_LIMIT)
                .max(1),
            archive_path: args
                .archive_path
                .clone()
                .or_else(|| settings.archive_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_PATH)),
            concurrency: args.concurrency.or(settings.concurrency).unwrap_or(1).max(1),
            extract,
            noise,
        };
        debug!(
            archive = %config.archive_path.display(),
            max_summary_lines = config.max_summary_lines,
            page_size = config.search.page_size,
            max_pages = config.search.max_pages,
            concurrency = config.concurrency,
            reasoning = config.reasoning.is_some(),
            "Resolved pipeline configuration"
        );
        Ok(config)
    }
}

/// Settings for the `export` command.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Archive to read.
    pub source: PathBuf,
    /// JSON file to rewrite.
    pub output: PathBuf,
    /// Bullet limit for rebuilt summaries.
    pub max_lines: usize,
}

impl ExportConfig {
    /// Same precedence as [`PipelineConfig::resolve`]; the source defaults
    /// to the archive path.
    pub fn resolve(args: &ExportArgs, settings: &Settings) -> Self {
        ExportConfig {
            source: args
                .source
                .clone()
                .or_else(|| settings.export_source.clone())
                .or_else(|| settings.archive_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_PATH)),
            output: args
                .output
                .clone()
                .or_else(|| settings.export_output.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH)),
            max_lines: args
                .max_lines
                .or(settings.export_max_lines)
                .unwrap_or(DEFAULT_EXPORT_MAX_LINES)
                .max(1),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
