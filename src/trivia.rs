//! Trivia about the two most recent cities of a game.
//!
//! The text comes from an LLM reached over HTTP (Anthropic Messages API shape). The
//! service is slow and may fail: every call is bounded by a timeout and any error is
//! replaced with [`FALLBACK_MESSAGE`] so the game itself never waits on it.

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::TriviaConfig;
use crate::logutil::escape_log;
use crate::metrics;

/// Shown whenever trivia cannot be produced.
pub const FALLBACK_MESSAGE: &str = "Sorry, facts about these cities are unavailable right now.";

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("trivia service is disabled")]
    Disabled,

    #[error("API key not configured")]
    NoApiKey,

    #[error("request timeout after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Black-box text service describing two cities.
#[async_trait]
pub trait TriviaSource: Send + Sync {
    async fn describe(&self, city_a: &str, city_b: &str) -> Result<String, TriviaError>;
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub fn build_prompt(city_a: &str, city_b: &str) -> String {
    format!(
        "Give one short, surprising fact about the city {} and one about the city {}. \
         Two sentences in total, no introduction.",
        city_a, city_b
    )
}

/// HTTP trivia client.
pub struct HttpTrivia {
    config: TriviaConfig,
    client: reqwest::Client,
}

impl HttpTrivia {
    pub fn new(config: TriviaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Check if the service is properly configured
    pub fn is_configured(&self) -> bool {
        self.config.enabled && !self.config.api_key.is_empty()
    }

    async fn fetch(&self, prompt: String) -> Result<String, TriviaError> {
        let body = ApiRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| TriviaError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TriviaError::Api { status, message });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| TriviaError::Parse(e.to_string()))?;
        let text: String = parsed
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        let text = text.trim();
        if text.is_empty() {
            return Err(TriviaError::Parse("empty completion".into()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl TriviaSource for HttpTrivia {
    async fn describe(&self, city_a: &str, city_b: &str) -> Result<String, TriviaError> {
        if !self.config.enabled {
            return Err(TriviaError::Disabled);
        }
        if self.config.api_key.is_empty() {
            return Err(TriviaError::NoApiKey);
        }
        let secs = self.config.timeout_seconds as u64;
        debug!("trivia: requesting facts for {} / {}", escape_log(city_a), escape_log(city_b));
        timeout(Duration::from_secs(secs), self.fetch(build_prompt(city_a, city_b)))
            .await
            .map_err(|_| TriviaError::Timeout(secs))?
    }
}

/// Ask `source` about the two cities within `limit`; any failure yields [`FALLBACK_MESSAGE`].
///
/// Returns the text and whether it came from the service.
pub async fn describe_or_fallback(
    source: &dyn TriviaSource,
    city_a: &str,
    city_b: &str,
    limit: Duration,
) -> (String, bool) {
    match timeout(limit, source.describe(city_a, city_b)).await {
        Ok(Ok(text)) => (text, true),
        Ok(Err(e)) => {
            warn!("trivia unavailable: {}", e);
            metrics::inc_trivia_fallbacks();
            (FALLBACK_MESSAGE.to_string(), false)
        }
        Err(_) => {
            warn!("trivia unavailable: timed out after {:?}", limit);
            metrics::inc_trivia_fallbacks();
            (FALLBACK_MESSAGE.to_string(), false)
        }
    }
}
