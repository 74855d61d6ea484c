//! Deterministic summaries built without any external call.

use crate::sanitize::{clean_text, keep_sign, trim_edge_dashes};
use crate::utils::truncate_chars;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet emitted when title, description and body are all empty.
pub const EMPTY_INPUT_BULLET: &str = "- 요약할 본문이 부족합니다.";

/// Sentence-final punctuation, optionally followed by closing quotes or
/// brackets, then whitespace. Korean `다.`/`요.` endings are covered by the
/// period.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?。！？…]+["'”’)\]]*\s+"#).expect("valid regex"));

/// A leading list marker: `-`, `*`, `•`, `·`, `–` (repeated or nested) or an
/// ordinal such as `1.` / `2)`. A dash directly before a digit is a sign, see
/// [`strip_list_marker`].
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:[-*•·–]\s*)+|\d{1,3}[.)]\s+)").expect("valid regex"));

const TERMINALS: [char; 7] = ['.', '!', '?', '。', '！', '？', '…'];
const CLOSERS: [char; 6] = ['"', '\'', '”', '’', ')', ']'];

/// Split text into sentences at terminal punctuation. Each piece is trimmed
/// of surrounding spaces and dashes; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        push_sentence(&mut sentences, &text[start..m.end()]);
        start = m.end();
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(out: &mut Vec<String>, piece: &str) {
    let piece = trim_edge_dashes(piece);
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

/// Remove one leading list marker, keeping a minus sign such as `-5%`.
fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER.find(line) {
        Some(m) => keep_sign(line, &line[m.end()..]),
        None => line,
    }
}

/// Append a period unless the sentence already ends in terminal
/// punctuation (closing quotes and brackets are looked through).
pub fn terminate(sentence: &str) -> String {
    let core = sentence.trim_end().trim_end_matches(CLOSERS);
    if core.ends_with(TERMINALS) {
        sentence.trim_end().to_string()
    } else {
        format!("{}.", sentence.trim_end())
    }
}

/// Rewrite arbitrary text as `- ` bullets, one per non-empty line, keeping
/// at most `max_lines`.
///
/// Existing markers (`-`, `*`, `•`, `·`, `–`, `1.`, `1)`) are replaced;
/// plain paragraph lines become bullets as they are.
pub fn normalize_bullets(text: &str, max_lines: usize) -> String {
    text.lines()
        .map(|line| strip_list_marker(line.trim()).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .map(|line| format!("- {line}"))
        .join("\n")
}

/// One `- ` bullet per sentence of already sanitized text, at most
/// `max_lines`. Empty input gives an empty string.
pub fn sentence_bullets(text: &str, max_lines: usize) -> String {
    text.lines()
        .flat_map(split_sentences)
        .take(max_lines)
        .map(|s| format!("- {}", terminate(&s)))
        .join("\n")
}

/// Extractive bullet summary over title, description and body, in that
/// order. Each source line is cleaned and split into sentences; repeated
/// sentences are kept once.
pub fn local_bullets(title: &str, description: &str, body: &str, max_lines: usize) -> String {
    let sentences: Vec<String> = [title, description, body]
        .into_iter()
        .flat_map(str::lines)
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .flat_map(|line| split_sentences(&line))
        .unique()
        .take(max_lines)
        .collect();

    if sentences.is_empty() {
        return EMPTY_INPUT_BULLET.to_string();
    }
    sentences
        .iter()
        .map(|s| format!("- {}", terminate(s)))
        .join("\n")
}

/// Four-part short summary built from the first sentences of `text`:
/// a title line, a key-takeaway line and up to three bullets.
pub fn structured_template(title: &str, text: &str) -> String {
    let sentences: Vec<String> = text
        .lines()
        .flat_map(split_sentences)
        .unique()
        .take(3)
        .collect();

    let heading = match title.trim() {
        "" => sentences
            .first()
            .map(|s| truncate_chars(s, 40))
            .unwrap_or_default(),
        t => t.to_string(),
    };

    let mut lines = vec![format!("제목: {heading}")];
    if let Some(first) = sentences.first() {
        lines.push(format!("핵심: {}", terminate(first)));
    }
    lines.extend(sentences.iter().map(|s| format!("- {}", terminate(s))));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_korean() {
        let text = "정부가 지원책을 발표했다. 청년 고용이 늘었어요! 효과는? 지켜봐야 한다";
        assert_eq!(
            split_sentences(text),
            vec![
                "정부가 지원책을 발표했다.",
                "청년 고용이 늘었어요!",
                "효과는?",
                "지켜봐야 한다",
            ]
        );
    }

    #[test]
    fn test_split_keeps_decimals() {
        assert_eq!(
            split_sentences("성장률은 2.5% 였다. 전망은 밝다."),
            vec!["성장률은 2.5% 였다.", "전망은 밝다."]
        );
    }

    #[test]
    fn test_terminate() {
        assert_eq!(terminate("새 칩셋 발표"), "새 칩셋 발표.");
        assert_eq!(terminate("끝났다."), "끝났다.");
        assert_eq!(terminate("그는 \"좋다.\""), "그는 \"좋다.\"");
        assert_eq!(terminate("정말?"), "정말?");
    }

    #[test]
    fn test_local_bullets_scenario() {
        let text = local_bullets("새 칩셋 발표", "회사가 새로운 반도체를 공개했다.", "", 15);
        assert_eq!(text, "- 새 칩셋 발표.\n- 회사가 새로운 반도체를 공개했다.");
    }

    #[test]
    fn test_local_bullets_empty_input() {
        assert_eq!(local_bullets("", "  ", "", 15), EMPTY_INPUT_BULLET);
    }

    #[test]
    fn test_local_bullets_limit_and_dedup() {
        let body = "첫째 문장이다. 둘째 문장이다. 셋째 문장이다. 넷째 문장이다.";
        let text = local_bullets("첫째 문장이다.", "", body, 3);
        assert_eq!(
            text,
            "- 첫째 문장이다.\n- 둘째 문장이다.\n- 셋째 문장이다."
        );
    }

    #[test]
    fn test_local_bullets_drops_truncation_marker() {
        let text = local_bullets("제목", "", "본문 일부 입니다 [+1234 chars]", 5);
        assert_eq!(text, "- 제목.\n- 본문 일부 입니다.");
    }

    #[test]
    fn test_normalize_bullets_markers() {
        let raw = "* 하나\n• 둘\n\n1. 셋\n2) 넷\n– 다섯\n  - - 여섯\n일반 문단";
        assert_eq!(
            normalize_bullets(raw, 10),
            "- 하나\n- 둘\n- 셋\n- 넷\n- 다섯\n- 여섯\n- 일반 문단"
        );
    }

    #[test]
    fn test_normalize_bullets_limit() {
        let raw = (1..=20).map(|i| format!("줄 {i}")).join("\n");
        let text = normalize_bullets(&raw, 15);
        assert_eq!(text.lines().count(), 15);
        assert!(text.lines().all(|l| l.starts_with("- ")));
    }

    #[test]
    fn test_normalize_keeps_leading_numbers_in_text() {
        assert_eq!(normalize_bullets("1.5% 상승", 3), "- 1.5% 상승");
    }

    #[test]
    fn test_minus_sign_is_not_a_marker() {
        assert_eq!(
            normalize_bullets("-5% 감소\n- -3.2% 하락\n- 7% 증가", 5),
            "- -5% 감소\n- -3.2% 하락\n- 7% 증가"
        );
        assert_eq!(
            split_sentences("-5% 감소했다. 반등은 없었다 -"),
            vec!["-5% 감소했다.", "반등은 없었다"]
        );
        assert_eq!(sentence_bullets("–2% 역성장", 3), "- –2% 역성장.");
    }

    #[test]
    fn test_sentence_bullets() {
        let text = "첫 문장이다. 둘째 문장\n셋째 줄이다";
        assert_eq!(
            sentence_bullets(text, 24),
            "- 첫 문장이다.\n- 둘째 문장.\n- 셋째 줄이다."
        );
        assert_eq!(sentence_bullets(text, 1), "- 첫 문장이다.");
        assert_eq!(sentence_bullets("", 24), "");
    }

    #[test]
    fn test_structured_template() {
        let text = "반도체 수출이 늘었다. 정부는 지원을 확대한다.\n업계는 환영했다. 다음 분기도 긍정적이다.";
        assert_eq!(
            structured_template("수출 호조", text),
            "제목: 수출 호조\n핵심: 반도체 수출이 늘었다.\n- 반도체 수출이 늘었다.\n- 정부는 지원을 확대한다.\n- 업계는 환영했다."
        );
    }

    #[test]
    fn test_structured_template_without_title() {
        let text = structured_template("", "짧은 본문");
        assert_eq!(text, "제목: 짧은 본문\n핵심: 짧은 본문.\n- 짧은 본문.");
    }
}
