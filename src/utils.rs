//! Utility functions for string truncation and file system checks.
//!
//! All truncation here counts characters, not bytes: article text is mostly
//! Hangul, where byte slicing would split code points.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and a
/// count of the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// The first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => s[..cut].to_string(),
    }
}

/// Ensure the directory that will hold `file` exists and is writable.
///
/// Creates missing directories, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(file = %file.display()))]
pub async fn ensure_parent_writable(file: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    fs::create_dir_all(&dir).await?;
    let probe_path = dir.join("..__probe_write__");
    fs::File::create(&probe_path).await?;
    let _ = fs::remove_file(&probe_path).await;
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "반도체".repeat(10);
        let result = truncate_for_log(&s, 2);
        assert!(result.starts_with("반도…"));
        assert!(result.ends_with(&format!("(+{} bytes)", s.len() - "반도".len())));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("채용 시장", 2), "채용");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_ensure_parent_writable_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/deeper/archive.jsonl");
        ensure_parent_writable(&file).await.unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(!dir.path().join("nested/deeper/..__probe_write__").exists());
    }
}
