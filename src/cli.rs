//! Command-line interface definitions for News Archive.
//!
//! Every option can also be supplied through the environment variable named
//! in its `env` attribute. Values left unset here fall back to the optional
//! YAML settings file, then to built-in defaults (see [`crate::config`]).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Archive application.
///
/// # Examples
///
/// ```sh
/// # Fetch, summarize and append today's articles
/// NEWSAPI_KEY=... news_archive update
///
/// # Rebuild the static-site data file from the archive
/// news_archive export --source data/news_archive.jsonl --output docs/data/news_archive.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true, env = "NEWS_ARCHIVE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch new articles, summarize them and append unseen ones to the archive
    Update(UpdateArgs),
    /// Derive the display data file from the archive
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Search API key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Search API base URL
    #[arg(long, env = "NEWSAPI_BASE_URL")]
    pub newsapi_base_url: Option<String>,

    /// Reasoning service API key; summaries are built locally when absent
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Reasoning model identifier
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// Reasoning service base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Hours east of UTC used for the search date window and timestamps
    #[arg(long, env = "UTC_OFFSET_HOURS", allow_hyphen_values = true)]
    pub utc_offset_hours: Option<i32>,

    /// Maximum number of bullet lines per summary
    #[arg(long, env = "MAX_SUMMARY_LINES")]
    pub max_summary_lines: Option<usize>,

    /// Path of the append-only JSONL archive
    #[arg(short, long, env = "ARCHIVE_PATH")]
    pub archive_path: Option<PathBuf>,

    /// Maximum articles kept per category per run
    #[arg(long, env = "ITEM_LIMIT_PER_CATEGORY")]
    pub item_limit_per_category: Option<usize>,

    /// Articles requested per search page
    #[arg(long, env = "NEWS_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Maximum search pages fetched per category
    #[arg(long, env = "NEWS_MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Articles processed concurrently
    #[arg(long, env = "PIPELINE_CONCURRENCY")]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Archive to read
    #[arg(short, long, env = "SOURCE_JSONL")]
    pub source: Option<PathBuf>,

    /// Export file to write
    #[arg(short, long, env = "OUTPUT_JSON")]
    pub output: Option<PathBuf>,

    /// Maximum bullet lines when a record's summary has to be re-bulleted
    #[arg(long, env = "EXPORT_MAX_LINES")]
    pub max_lines: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_update_parsing() {
        let cli = Cli::parse_from([
            "news_archive",
            "update",
            "--archive-path",
            "/tmp/archive.jsonl",
            "--max-summary-lines",
            "10",
            "--utc-offset-hours",
            "-5",
        ]);

        match cli.command {
            Command::Update(args) => {
                assert_eq!(args.archive_path, Some(PathBuf::from("/tmp/archive.jsonl")));
                assert_eq!(args.max_summary_lines, Some(10));
                assert_eq!(args.utc_offset_hours, Some(-5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_export_short_flags() {
        let cli = Cli::parse_from([
            "news_archive",
            "export",
            "-s",
            "/tmp/in.jsonl",
            "-o",
            "/tmp/out.json",
        ]);

        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.source, Some(PathBuf::from("/tmp/in.jsonl")));
                assert_eq!(args.output, Some(PathBuf::from("/tmp/out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::parse_from(["news_archive", "export", "--config", "settings.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("settings.yaml")));
    }
}
