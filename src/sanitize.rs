//! Text sanitization applied to every field before it is stored or exported.
//!
//! [`sanitize`] never fails: a repair step that cannot do better returns its
//! input unchanged. Trailing feed/blog boilerplate is described by the
//! ordered [`FEED_NOISE`] table rather than inline checks.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// What kind of field is being sanitized. Decides line handling and whether
/// boilerplate stripping applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    Title,
    Url,
    Category,
    Timestamp,
    Thumbnail,
    Summary,
    Body,
}

impl FieldKind {
    fn is_multiline(self) -> bool {
        matches!(self, FieldKind::Summary | FieldKind::Body)
    }
}

/// Byte-sequence artifacts left behind when UTF-8 was decoded as a
/// single-byte encoding somewhere upstream.
const MOJIBAKE_MARKERS: [&str; 7] = ["Ã", "Â", "â€™", "â€œ", "â€", "ï¿½", "\u{fffd}"];

/// Ordered `(pattern, reason)` pairs. The first match of each pattern cuts
/// the text from the match start to the end.
pub(crate) static FEED_NOISE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bShare this:", "share bar"),
        (r"(?i)\bFacebook\s+Twitter\s+LinkedIn", "share bar"),
        (r"(?i)\bLike this:\s*Like\s+Loading\.\.\.", "like widget"),
        (r"(?i)(?:%d|\d+)\s+bloggers like this:", "like counter"),
        (r"(?i)You must be logged in to post a comment\.", "comment login prompt"),
        (r"(?i)Loading Comments\.\.\.", "comment loader"),
        (r"(?im)^[ \t]*Related\s+(?:articles?|posts?|stories|news)\b", "related footer"),
        (r"관련\s*기사\s*더\s*보기", "related footer"),
        (r"(?m)^[^\n]{0,60}[←→][^\n]{0,60}$", "navigation arrows"),
    ]
    .into_iter()
    .map(|(pattern, reason)| (Regex::new(pattern).expect("valid feed noise pattern"), reason))
    .collect()
});

static INLINE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));
static TRUNCATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[?\+\d+\s*chars\]?").expect("valid regex"));

/// Normalize an arbitrary, possibly absent string for storage.
///
/// Decodes HTML entities, repairs double-encoded UTF-8, drops control
/// characters, strips trailing boilerplate for `Summary`/`Body`, and
/// normalizes whitespace (line structure is kept only for those two kinds).
pub fn sanitize(text: Option<&str>, kind: FieldKind) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }

    let decoded = html_escape::decode_html_entities(text);
    let repaired = fix_mojibake(&decoded);
    let mut s = strip_control(&repaired);
    if kind.is_multiline() {
        s = strip_feed_noise(&s).into_owned();
    }
    normalize_whitespace(&s, kind.is_multiline())
}

/// Repair text that was UTF-8 decoded as Latin-1/Windows-1252.
///
/// Only runs when a marker is present. Characters with no single-byte form
/// are dropped, as are bytes that do not re-decode. An empty repair yields
/// the original text.
pub fn fix_mojibake(text: &str) -> String {
    if !MOJIBAKE_MARKERS.iter().any(|m| text.contains(m)) {
        return text.to_string();
    }

    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = u32::from(ch);
        if code <= 0xFF {
            bytes.push(code as u8);
            continue;
        }
        let mut buf = [0u8; 4];
        let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if !had_errors && encoded.len() == 1 {
            bytes.push(encoded[0]);
        }
    }

    let repaired: String = String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|c| *c != '\u{fffd}')
        .collect();
    if repaired.trim().is_empty() {
        text.to_string()
    } else {
        repaired
    }
}

/// Cut trailing share bars, comment widgets and footers.
pub fn strip_feed_noise(text: &str) -> Cow<'_, str> {
    let mut cut = text.len();
    for (pattern, _reason) in FEED_NOISE.iter() {
        if let Some(m) = pattern.find(&text[..cut]) {
            cut = m.start();
        }
    }
    if cut == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text[..cut].trim_end().to_string())
    }
}

/// Light cleanup for search-API fields: collapses whitespace and drops inline
/// URLs and the `[+N chars]` truncation marker.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_urls = INLINE_URL.replace_all(&collapsed, "");
    let without_marker = TRUNCATION_MARKER.replace_all(&without_urls, "");
    let joined = without_marker.split_whitespace().collect::<Vec<_>>().join(" ");
    trim_edge_dashes(&joined).to_string()
}

/// Trim spaces and dashes from both ends, except a dash glued to a leading
/// digit, which is a minus sign (`-5%`).
pub fn trim_edge_dashes(text: &str) -> &str {
    let text = text.trim().trim_end_matches([' ', '-']).trim_end();
    keep_sign(text, text.trim_start_matches([' ', '-']))
}

/// `rest` is a suffix of `line` left after stripping a leading marker. When
/// the marker ends in a dash glued to a digit, that dash is given back.
pub fn keep_sign<'a>(line: &'a str, rest: &'a str) -> &'a str {
    let marker = &line[..line.len() - rest.len()];
    match marker.chars().last() {
        Some(dash @ ('-' | '–')) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
            &line[marker.len() - dash.len_utf8()..]
        }
        _ => rest,
    }
}

/// Whether the text has any letter or digit in any script.
pub fn has_readable_text(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

fn normalize_whitespace(text: &str, multiline: bool) -> String {
    if multiline {
        text.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(sanitize(None, FieldKind::Title), "");
        assert_eq!(sanitize(Some(""), FieldKind::Body), "");
        assert_eq!(sanitize(Some("   \n\t "), FieldKind::Body), "");
    }

    #[test]
    fn test_control_characters_and_whitespace() {
        let raw = "  Hello\u{0}\u{7}   world \r\n";
        assert_eq!(sanitize(Some(raw), FieldKind::Title), "Hello world");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            sanitize(Some("AT&amp;T &quot;5G&quot; &#8211; 발표"), FieldKind::Title),
            "AT&T \"5G\" – 발표"
        );
    }

    #[test]
    fn test_multiline_keeps_lines() {
        let raw = "첫 문단   입니다.\n\n\n  둘째 문단입니다.  ";
        assert_eq!(
            sanitize(Some(raw), FieldKind::Body),
            "첫 문단 입니다.\n둘째 문단입니다."
        );
        assert_eq!(
            sanitize(Some(raw), FieldKind::Title),
            "첫 문단 입니다. 둘째 문단입니다."
        );
    }

    #[test]
    fn test_mojibake_repaired() {
        assert_eq!(fix_mojibake("Itâ€™s here"), "It’s here");
        assert_eq!(fix_mojibake("cafÃ©"), "café");
        assert_eq!(sanitize(Some("Itâ€™s here"), FieldKind::Title), "It’s here");
    }

    #[test]
    fn test_mojibake_untouched_without_markers() {
        let s = "정상적인 한국어 문장입니다.";
        assert_eq!(fix_mojibake(s), s);
    }

    #[test]
    fn test_mojibake_failure_keeps_original() {
        // Only the replacement character is present; nothing survives repair.
        assert_eq!(fix_mojibake("\u{fffd}"), "\u{fffd}");
    }

    #[test]
    fn test_feed_noise_only_for_body_kinds() {
        let raw = "본문 내용입니다.\nShare this:\nFacebook Twitter";
        assert_eq!(sanitize(Some(raw), FieldKind::Body), "본문 내용입니다.");
        assert_eq!(sanitize(Some(raw), FieldKind::Summary), "본문 내용입니다.");
        assert!(sanitize(Some(raw), FieldKind::Title).contains("Share this:"));
    }

    #[test]
    fn test_feed_noise_patterns() {
        let cases = [
            ("Story text. Like this: Like Loading... more", "Story text."),
            ("Story text. 12 bloggers like this: a b c", "Story text."),
            ("Story text. %d bloggers like this:", "Story text."),
            ("Story text.\nYou must be logged in to post a comment. Log in", "Story text."),
            ("Story text.\nLoading Comments... x", "Story text."),
            ("기사 본문입니다.\n관련 기사 더 보기\n다른 기사", "기사 본문입니다."),
            ("Story text.\nRelated articles\nOther story", "Story text."),
            ("Story text.\n← Previous post\nNext post →", "Story text."),
        ];
        for (raw, expected) in cases {
            assert_eq!(strip_feed_noise(raw), expected, "input: {raw:?}");
        }
    }

    #[test]
    fn test_feed_noise_keeps_inline_usage() {
        let long = "올해 매출은 지난해 대비 크게 늘었으며 영업이익 역시 10억→20억으로 두 배 증가했다고 회사 측은 설명했다. 업계에서는 이번 실적이 반도체 수요 회복의 신호라고 평가했다. 회사는 하반기에도 성장세가 이어질 것으로 내다봤다.";
        assert_eq!(strip_feed_noise(long), long);
        let related = "The bill is related to chip subsidies.";
        assert_eq!(strip_feed_noise(related), related);
    }

    #[test]
    fn test_feed_noise_table_has_reasons() {
        assert!(FEED_NOISE.iter().all(|(_, reason)| !reason.is_empty()));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  본문 일부 https://example.com/x 입니다… [+1234 chars]"),
            "본문 일부 입니다…"
        );
        assert_eq!(clean_text(" - 제목 - "), "제목");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_edge_dashes_keep_minus_sign() {
        assert_eq!(clean_text("-5% 감소"), "-5% 감소");
        assert_eq!(clean_text(" - -3% 하락 -"), "-3% 하락");
        assert_eq!(trim_edge_dashes("- 7% 증가"), "7% 증가");
        assert_eq!(trim_edge_dashes("--"), "");
    }

    #[test]
    fn test_has_readable_text() {
        assert!(has_readable_text("반도체"));
        assert!(has_readable_text("2025"));
        assert!(!has_readable_text(" .,!? — "));
    }
}
