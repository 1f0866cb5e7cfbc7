//! Chat Completions wire protocol.

use codequery_types::{Message, ToolDefinition};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::{ApiConfig, ProviderError, REQUEST_TIMEOUT, cap_error_body, http_client_with_timeout};

/// Request body: `{model, messages, tools}`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<FunctionTool<'a>>,
}

/// A tool declaration in `{type: "function", function: {...}}` form.
#[derive(Debug, Serialize)]
pub struct FunctionTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: &'a ToolDefinition,
}

impl<'a> From<&'a ToolDefinition> for FunctionTool<'a> {
    fn from(function: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            function,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ChatResponse {
    /// The first choice's message.
    pub fn into_message(self) -> Result<Message, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ProviderError::EmptyResponse)
    }
}

/// Non-streaming client for `<base_url>/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ChatClient {
    pub fn new(config: ApiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client_with_timeout(REQUEST_TIMEOUT)?,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send the full history and tool declarations; return the parsed response.
    pub async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, ProviderError> {
        let request = ChatRequest {
            model: self.config.model(),
            messages,
            tools: tools.iter().map(FunctionTool::from).collect(),
        };
        let body = serde_json::to_vec(&request).map_err(ProviderError::Encode)?;

        tracing::debug!(
            messages = messages.len(),
            tools = tools.len(),
            model = self.config.model(),
            "Sending chat completion request"
        );

        let mut builder = self
            .http
            .post(self.config.completions_url())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let text = text.trim();
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "Received chat response");

        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "Chat endpoint returned an error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: cap_error_body(text),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(text).map_err(|source| ProviderError::Decode {
                source,
                body: cap_error_body(text),
            })?;

        if let Some(error) = parsed.error {
            tracing::warn!(kind = ?error.kind, message = %error.message, "Chat endpoint reported an error");
            return Err(ProviderError::Api {
                message: error.message,
            });
        }
        Ok(parsed)
    }
}
