//! Chat-completions client for OpenAI-compatible endpoints.
//!
//! # Architecture
//!
//! - [`ApiConfig`] bundles the endpoint, credentials, and model name.
//! - [`openai::ChatClient`] sends one non-streaming completion request per
//!   call and returns the parsed [`openai::ChatResponse`].
//!
//! # Error Handling
//!
//! Transport failures, non-200 statuses, undecodable bodies, and `error`
//! objects embedded in a 200 response all surface as [`ProviderError`].
//! There is no retry; the caller decides whether to send again.

pub mod openai;

use std::time::Duration;

use codequery_types::ApiKey;
use reqwest::redirect::Policy;

pub use codequery_types;
pub use openai::{ChatClient, ChatResponse, Choice};

/// Whole-request timeout for a completion call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT_SECS: u64 = 30;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API error: {message}")]
    Api { message: String },
    #[error("failed to parse response: {source}\nBody: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("no response from model")]
    EmptyResponse,
    #[error("failed to marshal request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Endpoint + model configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: Option<ApiKey>,
    base_url: String,
    model: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(
        api_key: Option<ApiKey>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// `<base_url>/chat/completions`, tolerating a trailing slash on the base.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Host part of the base URL, for display.
    #[must_use]
    pub fn host(&self) -> &str {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map_or(self.base_url.as_str(), |(_, rest)| rest);
        without_scheme
            .split('/')
            .next()
            .unwrap_or(without_scheme)
    }
}

/// HTTP client with the completion timeout applied.
///
/// Redirects are not followed. Plain `http` stays allowed so local
/// OpenAI-compatible servers work.
pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .redirect(Policy::none())
        .build()
}

/// Bound an error body before it lands in an error message.
pub(crate) fn cap_error_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &body[..end])
}
