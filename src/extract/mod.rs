//! Main-body extraction from untrusted article HTML.
//!
//! Three candidate strategies are tried in a configurable order; the first
//! one that yields non-empty noise-filtered text wins:
//!
//! | Strategy | Source of text |
//! |----------|----------------|
//! | [`Strategy::WholeDocument`] | all visible text inside `<body>` |
//! | [`Strategy::TaggedContainer`] | `itemprop="articleBody"` or a content-like `id`/`class` |
//! | [`Strategy::CommentAnchored`] | a div/section right after an "article body" comment |
//!
//! Within one strategy the longest candidate wins. Malformed markup never
//! fails; the parser keeps whatever structure it recovered.

mod charset;
mod state;

pub use charset::{charset_from_content_type, decode_html};

use crate::noise::NoiseFilter;
use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use state::{Collected, ExtractorState};
use tracing::{debug, instrument};

static BODY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<body[\s>/]").expect("valid regex"));

/// Ways of locating the main text, tried in [`ExtractOptions::strategy_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every paragraph under `<body>`; needs an explicit `<body>` tag.
    WholeDocument,
    /// The largest `<article>`, `role=main`/`article` or body-hinted
    /// container.
    TaggedContainer,
    /// The element right after a marker comment such as `<!-- 기사 본문 -->`.
    CommentAnchored,
}

/// Tunables for [`Extractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Strategies in the order they are tried; the first non-empty wins.
    pub strategy_order: Vec<Strategy>,
    /// Output is cut to this many characters.
    pub max_chars: usize,
    /// Case-insensitive phrases that mark the next container as the body.
    pub comment_markers: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strategy_order: vec![
                Strategy::WholeDocument,
                Strategy::TaggedContainer,
                Strategy::CommentAnchored,
            ],
            max_chars: 12_000,
            comment_markers: ["기사 본문", "본문 시작", "article body", "articlebody"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Pulls the main article text out of an HTML page.
///
/// Each strategy's paragraphs go through the [`NoiseFilter`] before the
/// result is judged empty or not.
#[derive(Debug, Clone)]
pub struct Extractor {
    options: ExtractOptions,
    noise: NoiseFilter,
}

impl Extractor {
    /// # Arguments
    ///
    /// * `options` - Strategy order, character budget and comment markers
    /// * `noise` - Filter applied to each strategy's paragraphs
    pub fn new(options: ExtractOptions, noise: NoiseFilter) -> Self {
        Self { options, noise }
    }

    /// Decode raw page bytes and extract the main text.
    pub fn extract_bytes(&self, bytes: &[u8], declared_charset: Option<&str>) -> String {
        let html = decode_html(bytes, declared_charset);
        self.extract_html(&html)
    }

    /// Best-guess main article text, one paragraph per line, or an empty
    /// string when no strategy finds anything.
    #[instrument(level = "debug", skip_all, fields(html_bytes = html.len()))]
    pub fn extract_html(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut state = ExtractorState::new(&self.options.comment_markers);
        state::walk(&document, &mut state);
        let collected = state.finish();
        let has_body_tag = BODY_TAG.is_match(html);

        for strategy in &self.options.strategy_order {
            let text = self.candidate_text(*strategy, &collected, has_body_tag);
            if !text.is_empty() {
                debug!(?strategy, chars = text.chars().count(), "Extraction strategy matched");
                return truncate_chars(&text, self.options.max_chars);
            }
        }
        debug!("No extraction strategy produced text");
        String::new()
    }

    fn candidate_text(&self, strategy: Strategy, collected: &Collected, has_body_tag: bool) -> String {
        match strategy {
            Strategy::WholeDocument => match &collected.body {
                Some(lines) if has_body_tag => self.filtered(lines),
                _ => String::new(),
            },
            Strategy::TaggedContainer => self.longest(&collected.tagged),
            Strategy::CommentAnchored => self.longest(&collected.anchored),
        }
    }

    fn longest(&self, candidates: &[Vec<String>]) -> String {
        let mut best = String::new();
        for lines in candidates {
            let text = self.filtered(lines);
            if text.chars().count() > best.chars().count() {
                best = text;
            }
        }
        best
    }

    fn filtered(&self, lines: &[String]) -> String {
        self.noise.filter_paragraphs(lines).join("\n")
    }
}
