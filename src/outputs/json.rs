//! Static-site data export.
//!
//! Reads the whole JSONL archive, re-derives display fields for each record
//! and writes one compact JSON array, newest first:
//!
//! ```text
//! data/news_archive.jsonl  ──export──▶  docs/data/news_archive.json
//! ```
//!
//! Older archive lines may lack newer fields; `fetched_at` falls back to
//! `archived_at` and `article_published_at` to `published_at`. The archive
//! itself is never modified.

use crate::archive::parse_records;
use crate::error::ArchiveError;
use crate::sanitize::{sanitize, FieldKind};
use crate::summarizer::{sentence_bullets, UNSUMMARIZABLE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Display-ready record, in the field order the site reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub ai_summary: String,
    pub thumbnail: String,
    pub scraped_body: String,
    pub url: String,
    pub category: String,
    pub article_published_at: String,
    pub fetched_at: String,
    pub published_at: String,
    pub archived_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { rows: usize },
    /// The source archive was missing and a previous export already exists.
    KeptExisting,
}

/// Rebuild `output` from the archive at `source`.
///
/// A missing source is not an error: an existing output is left as it is,
/// otherwise an empty array is written.
#[instrument(level = "info", skip_all, fields(source = %source.display(), output = %output.display()))]
pub async fn export_archive(
    source: &Path,
    output: &Path,
    max_lines: usize,
) -> Result<ExportOutcome, ArchiveError> {
    let rows = match fs::read(source).await {
        Ok(raw) => parse_rows(&raw, max_lines),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if fs::try_exists(output).await.unwrap_or(false) {
                warn!("Source archive not found; keeping existing output");
                return Ok(ExportOutcome::KeptExisting);
            }
            warn!("Source archive not found; writing empty dataset");
            Vec::new()
        }
        Err(e) => return Err(ArchiveError::io(source, e)),
    };

    let json = serde_json::to_string(&rows)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ArchiveError::io(parent, e))?;
    }
    fs::write(output, json)
        .await
        .map_err(|e| ArchiveError::io(output, e))?;

    info!(rows = rows.len(), "Wrote export");
    Ok(ExportOutcome::Written { rows: rows.len() })
}

/// Parse every archive line into an [`ExportRow`], skipping malformed ones,
/// sorted newest first by `fetched_at`.
pub fn parse_rows(raw: &[u8], max_lines: usize) -> Vec<ExportRow> {
    let (records, skipped) = parse_records(raw);
    if skipped > 0 {
        warn!(skipped, "Skipped malformed archive lines");
    }
    let mut rows: Vec<ExportRow> = records
        .iter()
        .map(|record| export_row(record, max_lines))
        .collect();
    rows.sort_by(|a, b| sort_key(b).cmp(sort_key(a)));
    rows
}

fn sort_key(row: &ExportRow) -> &str {
    if row.fetched_at.is_empty() {
        &row.archived_at
    } else {
        &row.fetched_at
    }
}

/// Re-sanitize one archive record and derive its display fields.
///
/// A summary that is not already bulleted is rebuilt from the richest text
/// available (`scraped_body`, then `body`, then `summary`), and the detail
/// body shows the bulleted summary.
pub fn export_row(record: &Map<String, Value>, max_lines: usize) -> ExportRow {
    let text = |key: &str, kind: FieldKind| sanitize(field(record, key).as_deref(), kind);
    let either = |first: &str, second: &str, kind: FieldKind| {
        let value = field(record, first)
            .filter(|v| !v.is_empty())
            .or_else(|| field(record, second));
        sanitize(value.as_deref(), kind)
    };

    let mut summary = text("summary", FieldKind::Summary);
    let mut body = text("body", FieldKind::Body);
    let scraped_body = text("scraped_body", FieldKind::Body);
    let ai_summary = text("ai_summary", FieldKind::Summary);

    if looks_like_bullets(&summary) {
        body = summary.clone();
    } else {
        let source = [&scraped_body, &body, &summary]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default();
        let bullets = sentence_bullets(&source, max_lines);
        if !bullets.is_empty() {
            summary = bullets.clone();
            body = bullets;
        }
    }

    ExportRow {
        id: text("id", FieldKind::Id),
        title: text("title", FieldKind::Title),
        summary,
        body,
        ai_summary: if ai_summary.is_empty() {
            UNSUMMARIZABLE.to_string()
        } else {
            ai_summary
        },
        thumbnail: text("thumbnail", FieldKind::Thumbnail),
        scraped_body,
        url: text("url", FieldKind::Url),
        category: text("category", FieldKind::Category),
        article_published_at: either("article_published_at", "published_at", FieldKind::Timestamp),
        fetched_at: either("fetched_at", "archived_at", FieldKind::Timestamp),
        published_at: text("published_at", FieldKind::Timestamp),
        archived_at: text("archived_at", FieldKind::Timestamp),
    }
}

fn field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether the first non-blank line is a `-` bullet.
fn looks_like_bullets(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with('-'))
}
