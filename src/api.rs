//! Reasoning-service interaction.
//!
//! The summarizer only sees the [`AskAsync`] trait: a single prompt in, free
//! text out, with a classified [`ReasoningError`] on failure. Calls are made
//! exactly once; there is no retry at this layer because every caller has a
//! deterministic local fallback.
//!
//! [`ResponsesClient`] implements the trait against an OpenAI-compatible
//! Responses endpoint (`POST {base}/responses`).

use crate::config::ReasoningConfig;
use crate::error::ReasoningError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Trait for async reasoning-service interaction.
///
/// Implementors send one prompt and return the service's text. Test doubles
/// implement this directly.
pub trait AskAsync {
    /// Send `prompt` and return the generated text.
    async fn ask(&self, prompt: &str) -> Result<String, ReasoningError>;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesResponse {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text.filter(|t| !t.trim().is_empty()) {
            return text;
        }
        self.output
            .into_iter()
            .flat_map(|msg| msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Client for an OpenAI-compatible Responses API.
#[derive(Debug, Clone)]
pub struct ResponsesClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ResponsesClient {
    /// Build a client for `{base_url}/responses`.
    ///
    /// # Arguments
    ///
    /// * `config` - Credential, model name, base URL and request timeout
    ///
    /// # Returns
    ///
    /// `ReasoningError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ReasoningConfig) -> Result<Self, ReasoningError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ReasoningError::Network)?;
        Ok(Self {
            client,
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, prompt: &str) -> Result<String, ReasoningError> {
        let body = ResponsesRequest {
            model: &self.model,
            input: prompt,
            temperature: 0.2,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&raw, 300),
            });
        }

        let parsed: ResponsesResponse = serde_json::from_str(&raw).map_err(|e| {
            ReasoningError::Malformed(format!("{e}; body: {}", truncate_for_log(&raw, 300)))
        })?;
        let text = parsed.into_text();
        if text.trim().is_empty() {
            return Err(ReasoningError::Empty);
        }
        Ok(text)
    }
}

impl AskAsync for ResponsesClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String, ReasoningError> {
        let t0 = Instant::now();
        let res = self.request(prompt).await;
        let dt = t0.elapsed();

        match &res {
            Ok(text) => info!(
                elapsed_ms = dt.as_millis() as u64,
                chars = text.chars().count(),
                "Reasoning call succeeded"
            ),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Reasoning call failed"),
        }
        res
    }
}
