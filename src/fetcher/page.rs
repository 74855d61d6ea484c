//! Raw article page downloads.

use super::retry_fetch;
use crate::error::FetchError;
use crate::extract::charset_from_content_type;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Undecoded page body plus the charset the server declared, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// Response body exactly as received.
    pub bytes: Vec<u8>,
    /// `charset` parameter of the `Content-Type` header.
    pub charset: Option<String>,
}

/// HTTP client for article pages. Only `http`/`https` URLs are fetched.
pub struct PageFetcher {
    client: Client,
    max_attempts: usize,
}

impl PageFetcher {
    /// # Arguments
    ///
    /// * `timeout` - Per-request timeout, applied to each attempt
    /// * `user_agent` - Sent on every request
    /// * `max_attempts` - Attempts per page for transient failures
    ///
    /// # Returns
    ///
    /// `FetchError::Network` if the HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: &str, max_attempts: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_attempts,
        })
    }

    /// Download `url`, retrying transient failures. `None` for unusable URLs
    /// and for pages that could not be fetched.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch_raw_html(&self, url: &str) -> Option<RawPage> {
        let parsed = match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => u,
            _ => {
                warn!(error = %FetchError::InvalidUrl(url.to_string()), "Skipping page fetch");
                return None;
            }
        };
        let page = retry_fetch("article page", self.max_attempts, || self.fetch_once(&parsed)).await?;
        debug!(bytes = page.bytes.len(), charset = ?page.charset, "Fetched article page");
        Some(page)
    }

    async fn fetch_once(&self, url: &Url) -> Result<RawPage, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);
        let bytes = response.bytes().await?.to_vec();
        Ok(RawPage { bytes, charset })
    }
}
