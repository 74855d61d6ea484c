//! Append-only JSONL archive of processed articles.
//!
//! Each line is one [`ArchiveEntry`]. Lines are only ever appended; the file
//! is never rewritten or reordered. Dedup is by [`make_id`], a content
//! fingerprint of `(url, title, published_at)`.

use crate::error::ArchiveError;
use crate::models::ArchiveEntry;
use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Stable 16-hex-character id for an article.
///
/// Compatible with ids already present in existing archives: the first 16
/// hex digits of SHA-1 over `url|title|published_at`.
pub fn make_id(url: &str, title: &str, published_at: &str) -> String {
    let digest = Sha1::digest(format!("{url}|{title}|{published_at}").as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(16);
    id
}

/// Ids already present in the archive at `path`. A missing file is an empty
/// archive; blank lines and lines that are not valid UTF-8 JSON are skipped.
pub async fn load_existing_ids(path: &Path) -> Result<HashSet<String>, ArchiveError> {
    let raw = read_archive(path).await?.unwrap_or_default();
    Ok(ids_from(&raw, path))
}

/// Raw archive bytes, or `None` when the file does not exist yet.
async fn read_archive(path: &Path) -> Result<Option<Vec<u8>>, ArchiveError> {
    match fs::read(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ArchiveError::io(path, e)),
    }
}

/// Parse every record line of a JSONL archive.
///
/// Lines are split on `\n` as bytes so one undecodable line never hides the
/// rest of the file. Returns the parsed objects and how many non-blank lines
/// were skipped.
pub fn parse_records(raw: &[u8]) -> (Vec<serde_json::Map<String, serde_json::Value>>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for line in raw.split(|&b| b == b'\n') {
        let Ok(line) = std::str::from_utf8(line) else {
            skipped += 1;
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(serde_json::Value::Object(record)) => records.push(record),
            _ => skipped += 1,
        }
    }
    (records, skipped)
}

fn ids_from(raw: &[u8], path: &Path) -> HashSet<String> {
    let (records, skipped) = parse_records(raw);
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped malformed archive lines");
    }
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(id_string))
        .collect()
}

/// Ids in older records may be strings or numbers.
fn id_string(value: &serde_json::Value) -> Option<String> {
    let id = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Single writer for one archive file. Appends are serialized through an
/// async mutex so the id check and the write never interleave.
pub struct ArchiveWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ArchiveWriter {
    /// Writer for the archive at `path`. Nothing is created until the first
    /// non-empty append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Archive file this writer appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every entry whose id is non-empty and not yet archived,
    /// including ids seen earlier in the same batch. Returns how many lines
    /// were written. An empty batch leaves the file untouched.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), batch = entries.len()))]
    pub async fn append_entries(&self, entries: &[ArchiveEntry]) -> Result<usize, ArchiveError> {
        if entries.is_empty() {
            debug!("Nothing to append");
            return Ok(0);
        }
        let _guard = self.lock.lock().await;

        let existing = read_archive(&self.path).await?.unwrap_or_default();
        let mut seen = ids_from(&existing, &self.path);
        let mut buf = String::new();
        // Never glue a new record onto an unterminated last line.
        if existing.last().is_some_and(|&b| b != b'\n') {
            buf.push('\n');
        }
        let mut added = 0usize;
        for entry in entries {
            let id = entry.id.trim();
            if id.is_empty() || seen.contains(id) {
                continue;
            }
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
            seen.insert(id.to_string());
            added += 1;
        }

        if added == 0 {
            info!("All entries already archived");
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ArchiveError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ArchiveError::io(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| ArchiveError::io(&self.path, e))?;
        file.flush().await.map_err(|e| ArchiveError::io(&self.path, e))?;

        info!(added, "Appended archive entries");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn entry(url: &str, title: &str, published_at: &str) -> ArchiveEntry {
        ArchiveEntry {
            id: make_id(url, title, published_at),
            title: title.to_string(),
            summary: "- 요약.".to_string(),
            body: "본문".to_string(),
            ai_summary: "제목: t".to_string(),
            scraped_body: String::new(),
            url: url.to_string(),
            category: Category::It,
            thumbnail: String::new(),
            published_at: published_at.to_string(),
            fetched_at: "2025-05-06T10:00:00+09:00".to_string(),
            article_published_at: published_at.to_string(),
            archived_at: "2025-05-06T10:00:00+09:00".to_string(),
            source: "NewsAPI".to_string(),
        }
    }

    #[test]
    fn test_make_id_is_stable() {
        let a = make_id("https://news.example/1", "새 칩셋 발표", "2025-05-06T00:00:00Z");
        let b = make_id("https://news.example/1", "새 칩셋 발표", "2025-05-06T00:00:00Z");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, make_id("https://news.example/1", "새 칩셋 발표", "2025-05-07T00:00:00Z"));
    }

    #[test]
    fn test_make_id_matches_existing_archive() {
        assert_eq!(
            make_id("https://news.example/1", "새 칩셋 발표", "2025-05-06T00:00:00Z"),
            "213eef374501fea0"
        );
    }

    #[tokio::test]
    async fn test_append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path().join("data/news_archive.jsonl"));
        let e = entry("https://news.example/1", "제목", "2025-05-06T00:00:00Z");

        assert_eq!(writer.append_entries(&[e.clone()]).await.unwrap(), 1);
        assert_eq!(writer.append_entries(&[e.clone()]).await.unwrap(), 0);

        let raw = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(raw.lines().count(), 1);
        let stored: ArchiveEntry = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(stored, e);
    }

    #[tokio::test]
    async fn test_duplicates_within_batch() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path().join("archive.jsonl"));
        let a = entry("https://news.example/1", "제목", "2025-05-06T00:00:00Z");
        let b = entry("https://news.example/2", "다른 제목", "2025-05-06T00:00:00Z");
        let mut blank = b.clone();
        blank.id = "  ".to_string();

        let added = writer
            .append_entries(&[a.clone(), a.clone(), b, blank])
            .await
            .unwrap();
        assert_eq!(added, 2);
    }

    #[tokio::test]
    async fn test_existing_lines_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.jsonl");
        let legacy = "{\"id\": 12345, \"title\": \"legacy\"}\nnot json at all\n\n{\"id\": \"\"}\n";
        std::fs::write(&path, legacy).unwrap();

        let ids = load_existing_ids(&path).await.unwrap();
        assert_eq!(ids, HashSet::from(["12345".to_string()]));

        let writer = ArchiveWriter::new(&path);
        let e = entry("https://news.example/3", "새 기사", "2025-05-06T00:00:00Z");
        assert_eq!(writer.append_entries(&[e]).await.unwrap(), 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with(legacy));
        assert_eq!(raw.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_undecodable_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.jsonl");
        std::fs::write(
            &path,
            b"{\"id\":\"x\"}\n\xff\xfe garbage\n{\"id\":\"y\"}\n",
        )
        .unwrap();

        let ids = load_existing_ids(&path).await.unwrap();
        assert_eq!(ids, HashSet::from(["x".to_string(), "y".to_string()]));

        let writer = ArchiveWriter::new(&path);
        let e = entry("https://news.example/4", "깨진 줄 뒤 기사", "2025-05-06T00:00:00Z");
        assert_eq!(writer.append_entries(&[e]).await.unwrap(), 1);
        let raw = std::fs::read(&path).unwrap();
        let lines = raw.split(|&b| b == b'\n').filter(|l| !l.is_empty()).count();
        assert_eq!(lines, 4);
        assert!(raw.starts_with(b"{\"id\":\"x\"}\n\xff\xfe garbage\n"));
    }

    #[tokio::test]
    async fn test_unterminated_last_line_stays_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.jsonl");
        std::fs::write(&path, "{\"id\":\"legacy1\"}").unwrap();

        let writer = ArchiveWriter::new(&path);
        let e = entry("https://news.example/5", "이어 붙인 기사", "2025-05-06T00:00:00Z");
        assert_eq!(writer.append_entries(&[e.clone()]).await.unwrap(), 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\"id\":\"legacy1\"}\n{"));
        let ids = load_existing_ids(&path).await.unwrap();
        assert_eq!(ids, HashSet::from(["legacy1".to_string(), e.id.clone()]));
        assert_eq!(writer.append_entries(&[e]).await.unwrap(), 0);
    }

    #[test]
    fn test_parse_records_counts_skips() {
        let (records, skipped) = parse_records(b"{\"id\":1}\n\n[1,2]\n\xff\n{\"id\":\"b\"}");
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_empty_batch_leaves_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.jsonl");
        let writer = ArchiveWriter::new(&path);
        assert_eq!(writer.append_entries(&[]).await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArchiveWriter::new(dir.path().join("archive.jsonl"));
        let e = entry("https://news.example/9", "동시 기사", "2025-05-06T00:00:00Z");
        let batch = [e.clone()];

        let (a, b) = tokio::join!(writer.append_entries(&batch), writer.append_entries(&batch));
        assert_eq!(a.unwrap() + b.unwrap(), 1);
    }
}
