//! The request / tool-execution loop.

use std::path::Path;

use codequery_config::Config;
use codequery_providers::{ApiConfig, ChatClient};
use codequery_tools::{Sandbox, SensitivePathFilter, ToolCtx, ToolRegistry};
use codequery_types::{Message, ToolDefinition};

use crate::SessionError;
use crate::prompt::SYSTEM_PROMPT;

/// One conversation with the model.
///
/// `messages[0]` is always the system prompt.
pub struct Session {
    client: ChatClient,
    registry: ToolRegistry,
    ctx: ToolCtx,
    definitions: Vec<ToolDefinition>,
    messages: Vec<Message>,
}

impl Session {
    #[must_use]
    pub fn new(client: ChatClient, registry: ToolRegistry, ctx: ToolCtx) -> Self {
        let definitions = registry.definitions();
        Self {
            client,
            registry,
            ctx,
            definitions,
            messages: vec![Message::system(SYSTEM_PROMPT)],
        }
    }

    /// Wire up a session for `working_dir`: built-in tools, the default
    /// blocked patterns plus the directory's ignore file, and a client for
    /// the configured endpoint.
    pub fn from_config(config: &Config, working_dir: &Path) -> Result<Self, SessionError> {
        let sandbox = Sandbox::new(working_dir).map_err(|source| SessionError::WorkingDir {
            path: working_dir.to_path_buf(),
            source,
        })?;
        let filter = SensitivePathFilter::load(sandbox.working_dir());
        let api = ApiConfig::new(
            config.api_key.clone(),
            config.base_url.as_str(),
            config.model.as_str(),
        );
        let client = ChatClient::new(api)?;
        tracing::info!(
            working_dir = %sandbox.working_dir().display(),
            model = %config.model,
            "Session ready"
        );
        Ok(Self::new(
            client,
            ToolRegistry::with_builtins(),
            ToolCtx::new(sandbox, filter),
        ))
    }

    #[must_use]
    pub fn api_config(&self) -> &ApiConfig {
        self.client.config()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drop every turn except the system prompt.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    /// Send `user_text` and keep answering tool calls until the model replies
    /// without any.
    ///
    /// `on_tool_call` receives `(name, arguments, result)` once per executed
    /// call, before the next request goes out. Tool failures become result
    /// text. Endpoint failures abort the turn and leave history as it stands,
    /// so calling `chat` again resends it.
    pub async fn chat<F>(
        &mut self,
        user_text: &str,
        mut on_tool_call: F,
    ) -> Result<String, SessionError>
    where
        F: FnMut(&str, &str, &str),
    {
        self.messages.push(Message::user(user_text));

        loop {
            let response = self
                .client
                .complete(&self.messages, &self.definitions)
                .await?;
            let message = response.into_message()?;

            if !message.has_tool_calls() {
                let answer = message.answer_text().to_string();
                self.messages.push(message);
                return Ok(answer);
            }

            let calls = message.tool_calls.clone();
            self.messages.push(message);
            tracing::debug!(calls = calls.len(), "Model requested tools");

            for call in calls {
                let name = call.function.name.as_str();
                let arguments = call.function.arguments.as_str();
                let result = match self.registry.execute(name, arguments, &self.ctx).await {
                    Ok(output) => output,
                    Err(e) => format!("Error: {e}"),
                };
                on_tool_call(name, arguments, &result);
                self.messages.push(Message::tool_result(call.id, result));
            }
        }
    }
}
