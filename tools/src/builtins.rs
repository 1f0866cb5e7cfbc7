//! Built-in tool implementations.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{Value, json};
use tokio::task::spawn_blocking;

use super::markdown::format_markdown;
use super::process::run_command;
use super::sandbox::clean_path;
use super::{ToolCtx, ToolError, ToolExecutor, ToolFut, arg_bool, arg_int, arg_str};

const DEFAULT_HEAD_LINES: i64 = 50;
const DEFAULT_TREE_DEPTH: i64 = 3;

pub struct LsTool;
pub struct CatTool;
pub struct HeadTool;
pub struct GrepTool;
pub struct FindTool;
pub struct TreeTool;
pub struct WriteMarkdownTool;

/// The seven built-in tools, in declaration order.
#[must_use]
pub fn builtin_executors() -> Vec<Box<dyn ToolExecutor>> {
    vec![
        Box::new(LsTool),
        Box::new(CatTool),
        Box::new(HeadTool),
        Box::new(GrepTool),
        Box::new(FindTool),
        Box::new(TreeTool),
        Box::new(WriteMarkdownTool),
    ]
}

fn required_str<'a>(args: &'a Value, field: &'static str) -> Result<&'a str, ToolError> {
    match arg_str(args, field, "") {
        "" => Err(ToolError::MissingField { field }),
        value => Ok(value),
    }
}

/// `find` and `tree` take the path before their options, so a leading `-`
/// would be read as a flag.
fn path_operand(path: &str) -> String {
    if path.starts_with('-') {
        format!("./{path}")
    } else {
        path.to_string()
    }
}

impl ToolExecutor for LsTool {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List directory contents. Use this to see what files and folders exist in a directory."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory path to list (default: current directory)"
                }
            },
            "required": []
        })
    }

    fn summary(&self, args: &Value) -> String {
        arg_str(args, "path", ".").to_string()
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let path = arg_str(&args, "path", ".");
            run_command(
                "ls",
                &["-la", "--", path],
                ctx.sandbox.working_dir(),
                ctx.max_output_chars,
            )
            .await
        })
    }
}

impl ToolExecutor for CatTool {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn description(&self) -> &'static str {
        "Read and display the entire contents of a file."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["path"]
        })
    }

    fn summary(&self, args: &Value) -> String {
        arg_str(args, "path", "").to_string()
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let path = required_str(&args, "path")?;
            ctx.ensure_readable(path)?;
            run_command(
                "cat",
                &["--", path],
                ctx.sandbox.working_dir(),
                ctx.max_output_chars,
            )
            .await
        })
    }
}

impl ToolExecutor for HeadTool {
    fn name(&self) -> &'static str {
        "head"
    }

    fn description(&self) -> &'static str {
        "Read the first N lines of a file. Useful for previewing large files."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read"
                },
                "lines": {
                    "type": "integer",
                    "description": "Number of lines to read (default: 50)"
                }
            },
            "required": ["path"]
        })
    }

    fn summary(&self, args: &Value) -> String {
        let path = arg_str(args, "path", "");
        match arg_int(args, "lines", 0) {
            lines if lines > 0 => format!("{path} -n {lines}"),
            _ => path.to_string(),
        }
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let path = required_str(&args, "path")?;
            ctx.ensure_readable(path)?;
            let lines = arg_int(&args, "lines", DEFAULT_HEAD_LINES);
            if lines < 1 {
                return Err(ToolError::BadArgs {
                    message: format!("lines must be a positive integer, got {lines}"),
                });
            }
            let lines = lines.to_string();
            run_command(
                "head",
                &["-n", lines.as_str(), "--", path],
                ctx.sandbox.working_dir(),
                ctx.max_output_chars,
            )
            .await
        })
    }
}

impl ToolExecutor for GrepTool {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Search for a pattern in files. Returns matching lines with file names and line numbers."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The search pattern (regular expression)"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search in (default: current directory)"
                },
                "recursive": {
                    "type": "boolean",
                    "description": "Search recursively in subdirectories (default: true)"
                }
            },
            "required": ["pattern"]
        })
    }

    fn summary(&self, args: &Value) -> String {
        let pattern = arg_str(args, "pattern", "");
        let path = arg_str(args, "path", ".");
        if arg_bool(args, "recursive", true) {
            format!("-r \"{pattern}\" {path}")
        } else {
            format!("\"{pattern}\" {path}")
        }
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let pattern = required_str(&args, "pattern")?;
            let path = arg_str(&args, "path", ".");
            // Single-file output carries no filename prefix to filter on.
            // Directories fall through to the per-line filter below.
            if !ctx.sandbox.resolve(&clean_path(path)).is_dir() {
                ctx.ensure_readable(path)?;
            }

            let mut grep_args = vec!["-n", "--color=never"];
            if arg_bool(&args, "recursive", true) {
                grep_args.push("-r");
            }
            grep_args.extend(["--", pattern, path]);

            let output = run_command(
                "grep",
                &grep_args,
                ctx.sandbox.working_dir(),
                ctx.max_output_chars,
            )
            .await?;

            // Lines look like `file:line:text`. Only the text before the first
            // colon is treated as the filename.
            let kept: Vec<&str> = output
                .split('\n')
                .filter(|line| match line.find(':') {
                    Some(idx) if idx > 0 => !ctx.filter.is_blocked(&line[..idx]),
                    _ => true,
                })
                .collect();
            Ok(kept.join("\n"))
        })
    }
}

impl ToolExecutor for FindTool {
    fn name(&self) -> &'static str {
        "find"
    }

    fn description(&self) -> &'static str {
        "Find files by name pattern. Searches for files matching the given pattern."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "File name pattern to search for (e.g., '*.go', 'config*')"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (default: current directory)"
                }
            },
            "required": ["pattern"]
        })
    }

    fn summary(&self, args: &Value) -> String {
        let pattern = arg_str(args, "pattern", "");
        let path = arg_str(args, "path", ".");
        format!("\"{pattern}\" {path}")
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let pattern = required_str(&args, "pattern")?;
            let path = path_operand(arg_str(&args, "path", "."));

            let output = run_command(
                "find",
                &[path.as_str(), "-name", pattern, "-type", "f"],
                ctx.sandbox.working_dir(),
                ctx.max_output_chars,
            )
            .await?;

            let found = output
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty());
            Ok(ctx.filter.filter_blocked_paths(found).join("\n"))
        })
    }
}

impl ToolExecutor for TreeTool {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn description(&self) -> &'static str {
        "Show directory structure as a tree. Useful for understanding project layout."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Root directory (default: current directory)"
                },
                "depth": {
                    "type": "integer",
                    "description": "Maximum depth to display (default: 3)"
                }
            },
            "required": []
        })
    }

    fn summary(&self, args: &Value) -> String {
        let path = arg_str(args, "path", ".");
        let depth = arg_int(args, "depth", DEFAULT_TREE_DEPTH);
        format!("-L {depth} {path}")
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let path = path_operand(arg_str(&args, "path", "."));
            let depth = arg_int(&args, "depth", DEFAULT_TREE_DEPTH).to_string();
            let working_dir = ctx.sandbox.working_dir();

            match run_command(
                "tree",
                &["-L", depth.as_str(), path.as_str()],
                working_dir,
                ctx.max_output_chars,
            )
            .await
            {
                Ok(output) => Ok(output),
                Err(e) => {
                    tracing::debug!(error = %e, "tree unavailable, falling back to find");
                    run_command(
                        "find",
                        &[path.as_str(), "-maxdepth", depth.as_str(), "-print"],
                        working_dir,
                        ctx.max_output_chars,
                    )
                    .await
                }
            }
        })
    }
}

impl ToolExecutor for WriteMarkdownTool {
    fn name(&self) -> &'static str {
        "write_markdown"
    }

    fn description(&self) -> &'static str {
        "Create a new markdown (.md) file with the provided content. Use this to create documentation, READMEs, or reports based on information gathered from the codebase."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path where the markdown file should be created (must end with .md)"
                },
                "content": {
                    "type": "string",
                    "description": "The markdown content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn summary(&self, args: &Value) -> String {
        arg_str(args, "path", "").to_string()
    }

    fn execute<'a>(&'a self, args: Value, ctx: &'a ToolCtx) -> ToolFut<'a> {
        Box::pin(async move {
            let path = required_str(&args, "path")?;
            if !path.to_lowercase().ends_with(".md") {
                return Err(ToolError::BadArgs {
                    message: "only markdown files (.md) can be created".to_string(),
                });
            }
            let content = required_str(&args, "content")?;
            let formatted = format_markdown(content);

            let clean = ctx.sandbox.validate(path)?;
            let target = ctx.sandbox.resolve(&clean);
            let display = path.to_string();

            spawn_blocking(move || write_new_file(&target, &formatted, &display))
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool: "write_markdown".to_string(),
                    message: e.to_string(),
                })??;

            tracing::info!(path, "Created markdown file");
            Ok(format!("Successfully created markdown file: {path}"))
        })
    }
}

/// Create `target` with `content`, refusing to overwrite and creating parent
/// directories as needed.
fn write_new_file(target: &Path, content: &str, display: &str) -> Result<(), ToolError> {
    let already_exists = || ToolError::AlreadyExists {
        path: display.to_string(),
    };
    if target.try_exists().unwrap_or(false) {
        return Err(already_exists());
    }

    if let Some(parent) = target.parent() {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(parent).map_err(|source| ToolError::Write {
            action: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = match options.open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(already_exists()),
        Err(source) => {
            return Err(ToolError::Write {
                action: "write file",
                path: target.to_path_buf(),
                source,
            });
        }
    };
    if let Err(source) = file.write_all(content.as_bytes()) {
        drop(file);
        let _ = fs::remove_file(target);
        return Err(ToolError::Write {
            action: "write file",
            path: target.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::{DenialReason, Sandbox, SensitivePathFilter, ToolCtx, ToolError, ToolRegistry};

    struct Fixture {
        dir: TempDir,
        ctx: ToolCtx,
        registry: ToolRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let ctx = ToolCtx::new(
                Sandbox::new(dir.path()).unwrap(),
                SensitivePathFilter::with_defaults(),
            );
            Self {
                dir,
                ctx,
                registry: ToolRegistry::with_builtins(),
            }
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }

        async fn run(&self, name: &str, args: serde_json::Value) -> Result<String, ToolError> {
            self.registry
                .execute(name, &args.to_string(), &self.ctx)
                .await
        }

        fn summary(&self, name: &str, args: serde_json::Value) -> String {
            self.registry.summary(name, &args.to_string())
        }
    }

    #[tokio::test]
    async fn ls_lists_directory() {
        let fx = Fixture::new();
        fx.write("main.go", "package main\n");
        let out = fx.run("ls", json!({})).await.unwrap();
        assert!(out.contains("main.go"));
    }

    #[tokio::test]
    async fn ls_does_not_filter_sensitive_names() {
        let fx = Fixture::new();
        fx.write(".env", "TOKEN=1\n");
        let out = fx.run("ls", json!({"path": "."})).await.unwrap();
        assert!(out.contains(".env"));
    }

    #[tokio::test]
    async fn cat_reads_file() {
        let fx = Fixture::new();
        fx.write("test.txt", "hello world\n");
        let out = fx.run("cat", json!({"path": "test.txt"})).await.unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[tokio::test]
    async fn cat_requires_path() {
        let fx = Fixture::new();
        let err = fx.run("cat", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "path is required");
        let err = fx.run("cat", json!({"path": ""})).await.unwrap_err();
        assert_eq!(err.to_string(), "path is required");
    }

    #[tokio::test]
    async fn cat_refuses_blocked_file() {
        let fx = Fixture::new();
        fx.write(".env", "TOKEN=1\n");
        let err = fx.run("cat", json!({"path": ".env"})).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::SandboxViolation(DenialReason::BlockedPattern { .. })
        ));
        assert_eq!(err.to_string(), "access denied: .env is in ignore list");
    }

    #[tokio::test]
    async fn cat_rejects_traversal() {
        let fx = Fixture::new();
        let err = fx
            .run("cat", json!({"path": "../../../etc/passwd"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::SandboxViolation(DenialReason::PathTraversal { .. })
        ));
    }

    #[tokio::test]
    async fn head_reads_first_lines() {
        let fx = Fixture::new();
        let content: String = (1..=100).map(|i| format!("line {i}\n")).collect();
        fx.write("long.txt", &content);

        let out = fx
            .run("head", json!({"path": "long.txt", "lines": 10}))
            .await
            .unwrap();
        assert_eq!(out.lines().count(), 10);
        assert!(out.starts_with("line 1\n"));

        let out = fx.run("head", json!({"path": "long.txt"})).await.unwrap();
        assert_eq!(out.lines().count(), 50);
    }

    #[tokio::test]
    async fn head_rejects_non_positive_lines() {
        let fx = Fixture::new();
        fx.write("a.txt", "a\n");
        let err = fx
            .run("head", json!({"path": "a.txt", "lines": 0}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BadArgs { .. }));
    }

    #[tokio::test]
    async fn head_refuses_blocked_file() {
        let fx = Fixture::new();
        fx.write("server.pem", "-----BEGIN-----\n");
        let err = fx
            .run("head", json!({"path": "server.pem"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "access denied: server.pem is in ignore list");
    }

    #[tokio::test]
    async fn grep_non_recursive_scenario() {
        let fx = Fixture::new();
        fx.write("main.go", "package main\n\nfunc main() {\n}\n");

        let out = fx
            .run(
                "grep",
                json!({"pattern": "main", "path": "main.go", "recursive": false}),
            )
            .await
            .unwrap();
        assert!(out.contains("func main"));

        assert_eq!(
            fx.summary(
                "grep",
                json!({"pattern": "main", "path": ".", "recursive": false})
            ),
            "\"main\" ."
        );
    }

    #[tokio::test]
    async fn grep_drops_lines_from_blocked_files() {
        let fx = Fixture::new();
        fx.write("main.go", "func main() {}\n");
        fx.write(".env", "main=secret\n");
        fx.write("keys/id_rsa", "main key\n");

        let out = fx.run("grep", json!({"pattern": "main"})).await.unwrap();
        assert!(out.contains("main.go:1:func main() {}"));
        assert!(!out.contains(".env"));
        assert!(!out.contains("id_rsa"));
    }

    #[tokio::test]
    async fn grep_pattern_starting_with_dash_is_not_a_flag() {
        let fx = Fixture::new();
        fx.write("flags.txt", "use -v for verbose\n");
        let out = fx
            .run("grep", json!({"pattern": "-v", "path": "flags.txt"}))
            .await
            .unwrap();
        assert!(out.contains("use -v for verbose"));
    }

    #[tokio::test]
    async fn grep_requires_pattern() {
        let fx = Fixture::new();
        let err = fx.run("grep", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "pattern is required");
    }

    #[tokio::test]
    async fn grep_refuses_blocked_search_file() {
        let fx = Fixture::new();
        fx.write(".env", "TOKEN=1\n");
        let err = fx
            .run("grep", json!({"pattern": "TOKEN", "path": ".env"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::SandboxViolation(DenialReason::BlockedPattern { .. })
        ));
    }

    #[tokio::test]
    async fn grep_searches_directory_with_blocked_looking_name() {
        let fx = Fixture::new();
        fx.write("src/secret_store/mod.rs", "fn main() {}\n");
        fx.write("src/secret_store/.env", "main=1\n");

        let scoped = fx
            .run("grep", json!({"pattern": "main", "path": "src/secret_store"}))
            .await
            .unwrap();
        assert!(scoped.contains("src/secret_store/mod.rs:1:fn main() {}"));
        assert!(!scoped.contains(".env"));

        let parent = fx
            .run("grep", json!({"pattern": "main", "path": "src"}))
            .await
            .unwrap();
        assert!(parent.contains("src/secret_store/mod.rs:1:fn main() {}"));
        assert!(!parent.contains(".env"));
    }

    // Known limitation: the filename is whatever precedes the first colon, so
    // names containing a colon are not filtered reliably. Only the call's
    // success is checked here.
    #[tokio::test]
    async fn grep_colon_in_filename_edge_case() {
        let fx = Fixture::new();
        fx.write("notes:v2.txt", "main entry\n");
        let result = fx.run("grep", json!({"pattern": "main"})).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn find_lists_matches_without_blocked_files() {
        let fx = Fixture::new();
        fx.write("main.go", "");
        fx.write("src/lib.go", "");
        fx.write("src/server.pem", "");
        fx.write(".env", "");
        fx.write("README.md", "");

        let out = fx.run("find", json!({"pattern": "*.go"})).await.unwrap();
        let mut lines: Vec<&str> = out.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["./main.go", "./src/lib.go"]);

        let out = fx.run("find", json!({"pattern": "*"})).await.unwrap();
        assert!(out.contains("README.md"));
        assert!(!out.contains("server.pem"));
        assert!(!out.contains(".env"));
        assert!(out.lines().all(|line| !line.trim().is_empty()));
    }

    #[tokio::test]
    async fn find_requires_pattern() {
        let fx = Fixture::new();
        let err = fx.run("find", json!({"path": "."})).await.unwrap_err();
        assert_eq!(err.to_string(), "pattern is required");
    }

    #[tokio::test]
    async fn tree_shows_nested_files() {
        let fx = Fixture::new();
        fx.write("src/main.rs", "");
        let out = fx.run("tree", json!({"depth": 2})).await.unwrap();
        assert!(out.contains("src"));
        assert!(out.contains("main.rs"));
    }

    #[tokio::test]
    async fn write_markdown_creates_formatted_file() {
        let fx = Fixture::new();
        let out = fx
            .run(
                "write_markdown",
                json!({"path": "notes.md", "content": "# Title\n\n\n\n\nBody\n\n\n\nTail"}),
            )
            .await
            .unwrap();
        assert_eq!(out, "Successfully created markdown file: notes.md");

        let written = fs::read_to_string(fx.dir.path().join("notes.md")).unwrap();
        assert_eq!(written, "# Title\n\n\nBody\n\n\nTail\n");
    }

    #[tokio::test]
    async fn write_markdown_never_overwrites() {
        let fx = Fixture::new();
        let args = json!({"path": "notes.md", "content": "first"});
        fx.run("write_markdown", args).await.unwrap();

        let err = fx
            .run(
                "write_markdown",
                json!({"path": "notes.md", "content": "second"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::AlreadyExists { .. }));
        assert_eq!(err.to_string(), "file already exists: notes.md");
        let written = fs::read_to_string(fx.dir.path().join("notes.md")).unwrap();
        assert_eq!(written, "first\n");
    }

    #[tokio::test]
    async fn write_markdown_creates_parent_directories() {
        let fx = Fixture::new();
        fx.run(
            "write_markdown",
            json!({"path": "docs/api/overview.MD", "content": "# API"}),
        )
        .await
        .unwrap();
        let written = fs::read_to_string(fx.dir.path().join("docs/api/overview.MD")).unwrap();
        assert_eq!(written, "# API\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_markdown_sets_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let fx = Fixture::new();
        fx.run("write_markdown", json!({"path": "mode.md", "content": "x"}))
            .await
            .unwrap();
        let mode = fs::metadata(fx.dir.path().join("mode.md"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o600, 0o600);
        assert_eq!(mode & 0o111, 0);
    }

    #[tokio::test]
    async fn write_markdown_rejects_other_extensions() {
        let fx = Fixture::new();
        let err = fx
            .run(
                "write_markdown",
                json!({"path": "script.sh", "content": "echo hi"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "only markdown files (.md) can be created");
        assert!(!fx.dir.path().join("script.sh").exists());
    }

    #[tokio::test]
    async fn write_markdown_requires_fields() {
        let fx = Fixture::new();
        let err = fx
            .run("write_markdown", json!({"content": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "path is required");

        let err = fx
            .run("write_markdown", json!({"path": "a.md"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "content is required");
    }

    #[tokio::test]
    async fn write_markdown_rejects_traversal() {
        let fx = Fixture::new();
        let err = fx
            .run(
                "write_markdown",
                json!({"path": "../outside.md", "content": "x"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::SandboxViolation(DenialReason::PathTraversal { .. })
        ));
    }

    #[test]
    fn summaries() {
        let fx = Fixture::new();
        let cases = [
            ("ls", json!({"path": "src"}), "src"),
            ("ls", json!({}), "."),
            ("cat", json!({"path": "main.go"}), "main.go"),
            ("head", json!({"path": "main.go", "lines": 20}), "main.go -n 20"),
            ("head", json!({"path": "main.go"}), "main.go"),
            ("grep", json!({"pattern": "TODO", "path": "src"}), "-r \"TODO\" src"),
            (
                "grep",
                json!({"pattern": "TODO", "path": "src", "recursive": false}),
                "\"TODO\" src",
            ),
            ("find", json!({"pattern": "*.go"}), "\"*.go\" ."),
            ("tree", json!({"path": "src", "depth": 2}), "-L 2 src"),
            ("tree", json!({}), "-L 3 ."),
            ("write_markdown", json!({"path": "README.md", "content": "x"}), "README.md"),
        ];
        for (name, args, expected) in cases {
            assert_eq!(fx.summary(name, args), expected, "summary of {name}");
        }
    }
}
