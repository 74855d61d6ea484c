//! # News Archive
//!
//! Collects Korean-language news articles from a search API, recovers each
//! article's main text from its page, summarizes it, and appends unseen
//! articles to an append-only JSONL archive. A second command derives the
//! static-site data file from that archive.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... OPENAI_API_KEY=... news_archive update
//! news_archive export
//! ```
//!
//! ## Architecture
//!
//! 1. **Search**: fetch candidate metadata per category, with retries
//! 2. **Extraction**: download each page and pick its main body text
//! 3. **Summarization**: reasoning-service bullets with a local fallback
//! 4. **Archive**: append entries whose content id is not yet stored
//!
//! Without `OPENAI_API_KEY` every summary is built locally.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod archive;
mod cli;
mod config;
mod error;
mod extract;
mod fetcher;
mod models;
mod noise;
mod outputs;
mod pipeline;
mod sanitize;
mod summarizer;
mod utils;

use cli::{Cli, Command, ExportArgs, UpdateArgs};
use config::{ExportConfig, PipelineConfig, Settings};
use outputs::json::{export_archive, ExportOutcome};
use pipeline::Pipeline;
use utils::ensure_parent_writable;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_archive starting up");

    let cli = Cli::parse();
    debug!(config = ?cli.config, "Parsed CLI arguments");

    let settings = Settings::load(cli.config.as_deref()).inspect_err(|e| {
        error!(error = %e, "Failed to load settings");
    })?;

    match &cli.command {
        Command::Update(args) => update(args, &settings).await?,
        Command::Export(args) => export(args, &settings).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn update(args: &UpdateArgs, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let config = PipelineConfig::resolve(args, settings).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    // Early check: the archive directory must be writable before any
    // network work is done.
    if let Err(e) = ensure_parent_writable(&config.archive_path).await {
        error!(
            path = %config.archive_path.display(),
            error = %e,
            "Archive directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let pipeline = Pipeline::from_config(&config)?;
    let now = Utc::now().with_timezone(&config.utc_offset);
    let report = pipeline.run(now).await.inspect_err(|e| {
        error!(error = %e, "Archive write failed");
    })?;
    debug!(?report, "Run report");
    Ok(())
}

async fn export(args: &ExportArgs, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let config = ExportConfig::resolve(args, settings);
    match export_archive(&config.source, &config.output, config.max_lines).await? {
        ExportOutcome::Written { rows } => {
            info!(rows, output = %config.output.display(), "OK: wrote export");
        }
        ExportOutcome::KeptExisting => {
            info!(output = %config.output.display(), "OK: kept existing export");
        }
    }
    Ok(())
}
