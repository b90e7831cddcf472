use crate::engine::{ApiType, EngineOptions, Fetcher};
use crate::error::TranslationFailure;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Generic JSON-over-HTTP fetcher.
///
/// Sends `{"text": [...], "target_lang": "..."}` to the endpoint for the
/// configured [`ApiType`] and expects `{"translations": [...]}` back, where
/// each entry is either a string or an object with a `text` field.
pub struct HttpFetcher {
    client: reqwest::Client,
    free_url: String,
    pro_url: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslationEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranslationEntry {
    Plain(String),
    Object { text: String },
}

impl From<TranslationEntry> for String {
    fn from(entry: TranslationEntry) -> Self {
        match entry {
            TranslationEntry::Plain(text) | TranslationEntry::Object { text } => text,
        }
    }
}

impl HttpFetcher {
    pub fn new(free_url: impl Into<String>, pro_url: impl Into<String>) -> Result<Self> {
        // Minimal defaults, env-overridable.
        let timeout_secs = env::var("ENGINE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("ENGINE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            free_url: free_url.into(),
            pro_url: pro_url.into(),
        })
    }

    /// Same endpoint for both account tiers.
    pub fn single_endpoint(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::new(url.clone(), url)
    }

    /// Endpoints from `ENGINE_FREE_URL` and `ENGINE_PRO_URL`; either one
    /// falls back to the other.
    pub fn from_env() -> Result<Self> {
        let free = env::var("ENGINE_FREE_URL").ok();
        let pro = env::var("ENGINE_PRO_URL").ok();
        match (free, pro) {
            (Some(free), Some(pro)) => Self::new(free, pro),
            (Some(url), None) | (None, Some(url)) => Self::single_endpoint(url),
            (None, None) => Err(Error::configuration_with_context(
                "no translation endpoint configured",
                ErrorContext::new()
                    .with_field_path("ENGINE_FREE_URL")
                    .with_source("http_fetcher"),
            )),
        }
    }

    pub fn endpoint(&self, api_type: ApiType) -> &str {
        match api_type {
            ApiType::Free => &self.free_url,
            ApiType::Pro => &self.pro_url,
        }
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, items: &[String], options: &EngineOptions) -> Result<Vec<String>> {
        let api_key = options.api_key().ok_or_else(|| {
            Error::configuration_with_context(
                "No API key specified!",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("http_fetcher"),
            )
        })?;

        let url = self.endpoint(options.api_type());
        let body = TranslateRequest {
            text: items,
            target_lang: options.target_language(),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            tracing::debug!(status = status.as_u16(), %message, "provider rejected request");
            return Err(TranslationFailure::new(message)
                .with_status(status.as_u16())
                .into());
        }

        let parsed: TranslateResponse = serde_json::from_str(&text)?;
        Ok(parsed.translations.into_iter().map(String::from).collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
