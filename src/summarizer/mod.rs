//! Bullet and structured summaries with a deterministic local fallback.
//!
//! Two products per article:
//!
//! - **Bullet summary**: Stage A asks the reasoning service for a free-form
//!   bullet digest, Stage B asks it to reformat that digest into strict
//!   one-statement bullets. Any failure at either stage, or a missing
//!   service, yields [`local::local_bullets`] instead.
//! - **Structured summary**: one reasoning call for a four-part summary,
//!   falling back to [`local::structured_template`], or to the
//!   [`UNSUMMARIZABLE`] sentinel when the text has nothing readable.
//!
//! Failures never escape; the tier that produced the text is recorded on the
//! returned value.

mod local;
mod prompts;

pub use local::{normalize_bullets, sentence_bullets};

use local::{local_bullets, structured_template};

use crate::api::AskAsync;
use crate::error::{FailureKind, ReasoningError};
use crate::sanitize::{has_readable_text, sanitize, FieldKind};
use crate::utils::truncate_for_log;
use tracing::{debug, warn};

/// Stored in `ai_summary` when the source text has no readable characters.
pub const UNSUMMARIZABLE: &str = "요약할 수 없는 내용입니다";

/// Sanitized text of one article, as fed to the summarizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
}

/// Why the local summarizer produced the bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NotConfigured,
    DraftFailed(FailureKind),
    ReformatFailed(FailureKind),
}

/// Which tier produced a bullet summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Reasoned,
    Local(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletSummary {
    pub text: String,
    pub source: SummarySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredKind {
    Reasoned,
    /// Built from the first sentences by [`local::structured_template`].
    Template,
    /// The [`UNSUMMARIZABLE`] sentinel.
    Unsummarizable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredSummary {
    pub text: String,
    pub kind: StructuredKind,
}

/// Produces both summaries for an article, degrading to local ones.
pub struct Summarizer<R> {
    reasoner: Option<R>,
    max_lines: usize,
}

impl<R: AskAsync> Summarizer<R> {
    /// `reasoner: None` runs every summary through the local fallback.
    pub fn new(reasoner: Option<R>, max_lines: usize) -> Self {
        Self {
            reasoner,
            max_lines: max_lines.max(1),
        }
    }

    /// Bullet summary of the article: every line starts with `- `, at most
    /// `max_lines` lines, never empty.
    pub async fn bullet_summary(&self, article: &ArticleText<'_>) -> BulletSummary {
        let Some(reasoner) = &self.reasoner else {
            return self.local(article, FallbackReason::NotConfigured);
        };

        let draft_prompt =
            prompts::draft(article.title, article.description, article.body, self.max_lines);
        let draft = match reasoner.ask(&draft_prompt).await {
            Ok(text) => text,
            Err(e) => return self.degrade(article, FallbackReason::DraftFailed(e.kind()), &e),
        };

        let reformatted = match reasoner.ask(&prompts::reformat(&draft, self.max_lines)).await {
            Ok(text) => text,
            Err(e) => return self.degrade(article, FallbackReason::ReformatFailed(e.kind()), &e),
        };

        let text = normalize_bullets(&sanitize(Some(&reformatted), FieldKind::Summary), self.max_lines);
        if text.is_empty() {
            let e = ReasoningError::Malformed("no bullet lines in reformatted summary".to_string());
            return self.degrade(article, FallbackReason::ReformatFailed(e.kind()), &e);
        }
        debug!(lines = text.lines().count(), "Bullet summary from reasoning service");
        BulletSummary {
            text,
            source: SummarySource::Reasoned,
        }
    }

    /// Short four-part summary of `text`; never empty.
    pub async fn structured_summary(&self, title: &str, text: &str) -> StructuredSummary {
        if !has_readable_text(text) {
            return StructuredSummary {
                text: UNSUMMARIZABLE.to_string(),
                kind: StructuredKind::Unsummarizable,
            };
        }

        if let Some(reasoner) = &self.reasoner {
            match reasoner.ask(&prompts::structured(title, text)).await {
                Ok(raw) => {
                    let cleaned = sanitize(Some(&raw), FieldKind::Summary);
                    if is_structured_shape(&cleaned) {
                        return StructuredSummary {
                            text: cleaned,
                            kind: StructuredKind::Reasoned,
                        };
                    }
                    warn!(
                        reply = %truncate_for_log(&cleaned, 120),
                        "Structured summary not in 제목/핵심/bullets shape; using template"
                    );
                }
                Err(e) => warn!(error = %e, "Structured summary failed; using template"),
            }
        }

        StructuredSummary {
            text: structured_template(title, text),
            kind: StructuredKind::Template,
        }
    }

    fn degrade(&self, article: &ArticleText<'_>, reason: FallbackReason, e: &ReasoningError) -> BulletSummary {
        warn!(error = %e, ?reason, "Bullet summary falling back to local summarizer");
        self.local(article, reason)
    }

    fn local(&self, article: &ArticleText<'_>, reason: FallbackReason) -> BulletSummary {
        let raw = local_bullets(article.title, article.description, article.body, self.max_lines);
        BulletSummary {
            text: normalize_bullets(&raw, self.max_lines),
            source: SummarySource::Local(reason),
        }
    }
}

/// `제목:` line, `핵심:` line, then one to three `- ` bullets, each with
/// readable text.
fn is_structured_shape(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let [title, key, bullets @ ..] = lines.as_slice() else {
        return false;
    };
    let labelled = |line: &str, label: &str| {
        line.strip_prefix(label).is_some_and(has_readable_text)
    };
    labelled(*title, "제목:")
        && labelled(*key, "핵심:")
        && (1..=3).contains(&bullets.len())
        && bullets.iter().all(|b| labelled(*b, "- "))
}
