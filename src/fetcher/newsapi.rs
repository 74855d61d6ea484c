//! Client for the NewsAPI `everything` endpoint.

use super::retry_fetch;
use crate::config::SearchConfig;
use crate::error::FetchError;
use crate::models::ArticleCandidate;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

/// Inclusive publication-date window for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Yesterday through today, in the timezone of `now`.
    pub fn ending_on(now: DateTime<FixedOffset>) -> Self {
        let to = now.date_naive();
        let from = to.checked_sub_days(Days::new(1)).unwrap_or(to);
        DateRange { from, to }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleCandidate>,
}

/// Search client for NewsAPI's `everything` endpoint.
///
/// The API key travels in the `X-Api-Key` header, never in the URL.
pub struct NewsApiClient {
    client: Client,
    config: SearchConfig,
    max_attempts: usize,
}

impl NewsApiClient {
    /// # Arguments
    ///
    /// * `config` - Credential, base URL, language and paging limits
    /// * `user_agent` - Sent on every request
    /// * `max_attempts` - Attempts per page for transient failures
    pub fn new(config: SearchConfig, user_agent: &str, max_attempts: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            config,
            max_attempts,
        })
    }

    fn endpoint(&self) -> Result<Url, FetchError> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|u| u.join("everything"))
            .map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))
    }

    /// One page of search results. Page numbers start at 1.
    pub async fn fetch_candidates(
        &self,
        range: &DateRange,
        query: &str,
        page: usize,
    ) -> Result<Vec<ArticleCandidate>, FetchError> {
        let mut url = self.endpoint()?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("language", &self.config.language)
            .append_pair("sortBy", "publishedAt")
            .append_pair("from", &range.from.to_string())
            .append_pair("to", &range.to.to_string())
            .append_pair("pageSize", &self.config.page_size.to_string())
            .append_pair("page", &page.to_string());

        let response = self
            .client
            .get(url.clone())
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;

        // Error bodies carry a code such as `rateLimited`; keep it alongside
        // the HTTP status so 5xx replies stay retryable.
        match serde_json::from_str::<SearchResponse>(&raw) {
            Ok(parsed) if parsed.status == "ok" => {
                debug!(page, count = parsed.articles.len(), "Search page received");
                Ok(parsed.articles)
            }
            Ok(parsed) => Err(FetchError::Api {
                status: status.as_u16(),
                code: parsed.code.unwrap_or_else(|| "unknown".to_string()),
                message: parsed.message.unwrap_or_default(),
            }),
            Err(_) if !status.is_success() => Err(FetchError::Status {
                status: status.as_u16(),
                url: url.path().to_string(),
            }),
            Err(e) => Err(FetchError::Decode(format!(
                "{e}; body: {}",
                truncate_for_log(&raw, 200)
            ))),
        }
    }

    /// Every page up to the configured maximum, stopping at the first short
    /// page. A page that still fails after retries ends the scan; whatever
    /// was collected before it is returned.
    #[instrument(level = "info", skip_all, fields(query = %query, from = %range.from, to = %range.to))]
    pub async fn fetch_all_pages(&self, range: &DateRange, query: &str) -> Vec<ArticleCandidate> {
        let mut all = Vec::new();
        for page in 1..=self.config.max_pages {
            let Some(batch) = retry_fetch("search page", self.max_attempts, || {
                self.fetch_candidates(range, query, page)
            })
            .await
            else {
                break;
            };
            let short = batch.len() < self.config.page_size;
            all.extend(batch);
            if short {
                break;
            }
        }
        info!(count = all.len(), "Fetched search candidates");
        all
    }
}
