//! Tool Executor Framework - core types, helpers, and the built-in codebase tools.

pub mod builtins;
pub mod filter;
pub mod markdown;
pub mod process;
pub mod sandbox;

use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::{Duration, Instant};

use codequery_types::ToolDefinition;
use serde_json::Value;
use tokio::time::timeout;

pub use filter::SensitivePathFilter;
pub use markdown::format_markdown;
pub use sandbox::Sandbox;

/// Tool execution future type alias.
pub type ToolFut<'a> = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>>;

/// Wall-clock limit applied to every tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum characters of subprocess output returned to the model.
pub const MAX_OUTPUT_CHARS: usize = 50_000;

const TRUNCATION_MARKER: &str = "\n... (output truncated)";

/// Error types for tool execution.
///
/// The `Display` text is what the model sees as the tool result.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{message}")]
    BadArgs { message: String },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("invalid arguments: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("{0}")]
    SandboxViolation(DenialReason),
    #[error("command timed out")]
    Timeout { tool: String, elapsed: Duration },
    #[error("{tool}: {message}")]
    ExecutionFailed { tool: String, message: String },
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },
    #[error("duplicate tool registered: {name}")]
    DuplicateTool { name: String },
    #[error("file already exists: {path}")]
    AlreadyExists { path: String },
    #[error("failed to {action}: {source}")]
    Write {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a path was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    PathTraversal { attempted: String },
    BlockedPattern { attempted: String },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::PathTraversal { attempted } => {
                write!(f, "path traversal not allowed: {attempted}")
            }
            DenialReason::BlockedPattern { attempted } => {
                write!(f, "access denied: {attempted} is in ignore list")
            }
        }
    }
}

/// A tool the model can call. Each executor carries its own declaration so
/// the advertised set and the dispatch set come from the same values.
pub trait ToolExecutor: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> Value;
    /// Short rendering of the arguments for display next to the tool name.
    fn summary(&self, args: &Value) -> String;
    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a>;
}

/// Shared state every tool call runs against.
#[derive(Debug, Clone)]
pub struct ToolCtx {
    pub sandbox: Sandbox,
    pub filter: SensitivePathFilter,
    pub timeout: Duration,
    pub max_output_chars: usize,
}

impl ToolCtx {
    #[must_use]
    pub fn new(sandbox: Sandbox, filter: SensitivePathFilter) -> Self {
        Self {
            sandbox,
            filter,
            timeout: DEFAULT_TOOL_TIMEOUT,
            max_output_chars: MAX_OUTPUT_CHARS,
        }
    }

    /// Refuse paths matching the sensitive-path filter.
    pub(crate) fn ensure_readable(&self, path: &str) -> Result<(), ToolError> {
        if self.filter.is_blocked(path) {
            tracing::warn!(path, "Blocked read of sensitive path");
            return Err(ToolError::SandboxViolation(DenialReason::BlockedPattern {
                attempted: path.to_string(),
            }));
        }
        Ok(())
    }
}

/// Tool registry keyed by name, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    executors: Vec<Box<dyn ToolExecutor>>,
}

impl ToolRegistry {
    /// A registry holding the seven built-in tools.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self {
            executors: builtins::builtin_executors(),
        }
    }

    pub fn register(&mut self, executor: Box<dyn ToolExecutor>) -> Result<(), ToolError> {
        let name = executor.name();
        if self.executors.iter().any(|e| e.name() == name) {
            return Err(ToolError::DuplicateTool {
                name: name.to_string(),
            });
        }
        self.executors.push(executor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn ToolExecutor, ToolError> {
        self.executors
            .iter()
            .find(|e| e.name() == name)
            .map(AsRef::as_ref)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.executors.iter().map(|e| e.name()).collect()
    }

    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.executors
            .iter()
            .map(|exec| ToolDefinition::new(exec.name(), exec.description(), exec.schema()))
            .collect()
    }

    /// Parse `args_json`, validate any `path` argument, and run the named tool
    /// under the context's timeout.
    pub async fn execute(
        &self,
        name: &str,
        args_json: &str,
        ctx: &ToolCtx,
    ) -> Result<String, ToolError> {
        let args: Value = serde_json::from_str(args_json).map_err(|e| {
            tracing::warn!(tool = name, error = %e, "Failed to parse tool arguments");
            ToolError::InvalidJson(e)
        })?;
        if !args.is_object() {
            return Err(ToolError::BadArgs {
                message: "invalid arguments: expected a JSON object".to_string(),
            });
        }

        if let Some(path) = args.get("path").and_then(Value::as_str) {
            ctx.sandbox.validate(path)?;
        }

        let executor = self.lookup(name)?;

        let started = Instant::now();
        let result = match timeout(ctx.timeout, executor.execute(args, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool: name.to_string(),
                elapsed: started.elapsed(),
            }),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(tool = name, elapsed_ms, "Tool executed"),
            Err(e) => tracing::info!(tool = name, elapsed_ms, error = %e, "Tool failed"),
        }
        result
    }

    /// Display form of a call. Falls back to the raw JSON for unknown tools or
    /// unparsable arguments.
    #[must_use]
    pub fn summary(&self, name: &str, args_json: &str) -> String {
        let Ok(executor) = self.lookup(name) else {
            return args_json.to_string();
        };
        match serde_json::from_str::<Value>(args_json) {
            Ok(args) if args.is_object() => executor.summary(&args),
            _ => args_json.to_string(),
        }
    }
}

/// String argument, or `default` when missing, empty, or not a string.
pub(crate) fn arg_str<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    match args.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

/// Integer argument; any JSON number is accepted and fractions are truncated.
pub(crate) fn arg_int(args: &Value, key: &str, default: i64) -> i64 {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        _ => default,
    }
}

/// Boolean argument; only JSON booleans count.
pub(crate) fn arg_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Truncate tool output to at most `max_chars` characters plus a marker.
#[must_use]
pub fn truncate_output(output: String, max_chars: usize) -> String {
    let Some((end, _)) = output.char_indices().nth(max_chars) else {
        return output;
    };
    let mut truncated = output;
    truncated.truncate(end);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
