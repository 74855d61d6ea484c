//! Line-level classifier that removes UI chrome, bylines and contact lines
//! from extracted article text.
//!
//! The filter never turns non-empty input into empty output: if every line
//! looks like noise, the original lines are returned untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tunables for [`NoiseFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseConfig {
    /// Lines with fewer characters than this are dropped.
    pub min_chars: usize,
    /// Drop lines containing Japanese kana.
    pub reject_kana: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            min_chars: 12,
            reject_kana: true,
        }
    }
}

/// Why a line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseReason {
    /// Site chrome; the payload names the pattern family.
    Boilerplate(&'static str),
    /// Reporter or photo credit line.
    Byline,
    /// Email address or phone number.
    Contact,
    ForeignScript,
    TooShort,
}

/// Widget patterns only count on lines at most this long; longer lines are
/// article sentences that merely mention the word.
const WIDGET_MAX_CHARS: usize = 40;

static COPYRIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ⓒ|©|무단\s*전재|재배포\s*금지|(?i:copyright|all rights reserved)")
        .expect("valid copyright pattern")
});

static WIDGETS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"로그인|회원가입|(?i:\b(?:log ?in|sign ?in|sign ?up)\b)", "login"),
        (r"구독하기|구독\s*신청|뉴스레터|(?i:\bsubscribe\b|\bnewsletter\b)", "subscribe"),
        (r"쿠키|(?i:\bcookies?\b)", "cookie"),
        (
            r"페이스북|트위터|인스타그램|카카오톡|카카오스토리|네이버\s*블로그|(?i:\b(?:facebook|twitter|instagram|youtube|telegram)\b)",
            "social",
        ),
        (
            r"공유하기|댓글\s*(?:쓰기|달기|보기)|좋아요|기사\s*(?:더\s*)?보기|더보기|많이\s*본\s*뉴스|(?i:\bread more\b|\bshare\b|\bcomments?\b)",
            "share/comment",
        ),
    ]
    .into_iter()
    .map(|(pattern, reason)| (Regex::new(pattern).expect("valid widget pattern"), reason))
    .collect()
});

static BYLINE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[\[(]?\s*[가-힣]{2,4}\s*(?:기자|특파원|논설위원|객원기자)\s*[\])]?$",
        r"^[\[(]?\s*(?:기자|글|사진|취재|편집)\s*[\])]?\s*[:：]",
        r"^By\s+\p{Lu}",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid byline pattern"))
    .collect()
});

static CONTACT: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[\w.+-]+@[\w-]+\.[\w.-]+",
        r"(?:\+82[-.\s]?|\b0)\d{1,2}[-.)\s]\d{3,4}[-.\s]\d{4}\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid contact pattern"))
    .collect()
});

static KANA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Hiragana}\p{Katakana}]").expect("valid regex"));

/// Drops lines that are not article prose.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    config: NoiseConfig,
}

impl NoiseFilter {
    /// # Arguments
    ///
    /// * `config` - Minimum line length and unwanted-script switch
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }

    /// Classify a single trimmed line. `None` means the line is kept.
    pub fn classify(&self, line: &str) -> Option<NoiseReason> {
        let line = line.trim();
        let chars = line.chars().count();
        if COPYRIGHT.is_match(line) {
            return Some(NoiseReason::Boilerplate("copyright"));
        }
        if chars <= WIDGET_MAX_CHARS {
            if let Some((_, reason)) = WIDGETS.iter().find(|(re, _)| re.is_match(line)) {
                return Some(NoiseReason::Boilerplate(reason));
            }
        }
        if BYLINE.iter().any(|re| re.is_match(line)) {
            return Some(NoiseReason::Byline);
        }
        if CONTACT.iter().any(|re| re.is_match(line)) {
            return Some(NoiseReason::Contact);
        }
        if self.config.reject_kana && KANA.is_match(line) {
            return Some(NoiseReason::ForeignScript);
        }
        if chars < self.config.min_chars {
            return Some(NoiseReason::TooShort);
        }
        None
    }

    /// Keep the lines that do not look like noise, trimmed.
    ///
    /// Returns `lines` unchanged when filtering would leave nothing.
    pub fn filter_paragraphs(&self, lines: &[String]) -> Vec<String> {
        let kept: Vec<String> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| self.classify(line).is_none())
            .map(str::to_string)
            .collect();

        if kept.is_empty() {
            tracing::debug!(lines = lines.len(), "Every line looked like noise; keeping input");
            return lines.to_vec();
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keeps_article_paragraphs() {
        let filter = NoiseFilter::default();
        let input = lines(&[
            "삼성전자가 차세대 반도체 공정을 공개했다.",
            "로그인 후 이용해 주세요",
            "회사는 내년부터 양산에 들어갈 계획이라고 밝혔다.",
        ]);
        assert_eq!(
            filter.filter_paragraphs(&input),
            lines(&[
                "삼성전자가 차세대 반도체 공정을 공개했다.",
                "회사는 내년부터 양산에 들어갈 계획이라고 밝혔다.",
            ])
        );
    }

    #[test]
    fn test_classifies_reasons() {
        let filter = NoiseFilter::default();
        assert_eq!(
            filter.classify("뉴스레터 구독하기 버튼을 눌러주세요"),
            Some(NoiseReason::Boilerplate("subscribe"))
        );
        assert_eq!(
            filter.classify("Copyright 2025 Example News. All rights reserved."),
            Some(NoiseReason::Boilerplate("copyright"))
        );
        assert_eq!(
            filter.classify("이 기사를 페이스북으로 보내기"),
            Some(NoiseReason::Boilerplate("social"))
        );
        assert_eq!(filter.classify("[홍길동 기자]"), Some(NoiseReason::Byline));
        assert_eq!(filter.classify("By Jane Doe, Seoul bureau"), Some(NoiseReason::Byline));
        assert_eq!(
            filter.classify("문의는 reporter@example.co.kr 로 보내주세요"),
            Some(NoiseReason::Contact)
        );
        assert_eq!(
            filter.classify("대표전화 02-1234-5678 으로 연락 바랍니다"),
            Some(NoiseReason::Contact)
        );
        assert_eq!(
            filter.classify("これは日本語の記事の一部です。내용"),
            Some(NoiseReason::ForeignScript)
        );
        assert_eq!(filter.classify("짧은 줄"), Some(NoiseReason::TooShort));
        assert_eq!(filter.classify("정부는 새로운 고용 지원 정책을 발표했다."), None);
    }

    #[test]
    fn test_long_sentences_mentioning_widgets_survive() {
        let filter = NoiseFilter::default();
        let kakao = "카카오는 카카오톡 안에 인공지능 비서 기능을 넣고 내년 상반기까지 모든 이용자에게 순차적으로 제공할 계획이라고 밝혔다.";
        let share = "The company's market share in cloud infrastructure rose to 12 percent last quarter, analysts said.";
        let facebook = "메타는 페이스북과 인스타그램의 광고 매출이 전년 대비 크게 늘었다고 이날 실적 발표에서 설명했다.";
        assert_eq!(filter.classify(kakao), None);
        assert_eq!(filter.classify(share), None);
        assert_eq!(filter.classify(facebook), None);
        assert_eq!(
            filter.classify("카카오톡으로 기사 공유하기"),
            Some(NoiseReason::Boilerplate("social"))
        );
        assert_eq!(
            filter.classify("Share this article with friends"),
            Some(NoiseReason::Boilerplate("share/comment"))
        );
    }

    #[test]
    fn test_all_noise_returns_original() {
        let filter = NoiseFilter::default();
        let input = lines(&["로그인", "구독하기", "짧다"]);
        assert_eq!(filter.filter_paragraphs(&input), input);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let filter = NoiseFilter::default();
        assert!(filter.filter_paragraphs(&[]).is_empty());
    }

    #[test]
    fn test_min_chars_configurable() {
        let filter = NoiseFilter::new(NoiseConfig {
            min_chars: 3,
            reject_kana: true,
        });
        assert_eq!(filter.classify("짧은 줄"), None);
    }
}
