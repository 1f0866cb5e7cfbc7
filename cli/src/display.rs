//! Text shown to the user: banner, help, and tool activity lines.

use std::path::Path;

use crossterm::style::Stylize;

/// Longest tool result shown in debug mode.
pub const DEBUG_RESULT_CHARS: usize = 500;

pub fn print_banner(model: &str, host: &str) {
    println!("{}", "codequery: ask questions about your codebase".green().bold());
    println!("Model: {model} ({host})");
    println!("Type 'help' for commands, 'exit' to quit.");
    println!();
}

pub fn help_text(config_path: Option<&Path>) -> String {
    let config = config_path.map_or_else(
        || "~/.config/codequery/config.toml".to_string(),
        |p| p.display().to_string(),
    );
    format!(
        "\
Commands:
  help          Show this help
  clear, reset  Start a new conversation
  exit, quit    Leave codequery

Flags:
  --debug       Print tool arguments and results instead of the spinner
  -h, --help    Show usage and exit

Environment:
  OPENAI_API_KEY   API key (required)
  OPENAI_BASE_URL  Chat endpoint base URL (default https://api.openai.com/v1)
  CODEQUERY_MODEL  Model name (default gpt-4o)
  RUST_LOG         Log filter (default info)

Config file:
  {config}
  TOML with keys api_key, base_url, model. Environment variables take
  precedence. An older config.json is not read; move its values here.

Files matching patterns in .codequeryignore are hidden from the model."
    )
}

pub fn legacy_config_note(legacy: &Path) -> String {
    format!(
        "{} is no longer read; codequery now uses config.toml in the same directory \
         (api_key = \"...\", base_url = \"...\", model = \"...\")",
        legacy.display()
    )
}

pub fn print_tool_line(name: &str, summary: &str) {
    println!("{}", format!("  > {name} {summary}").cyan().dim());
}

pub fn print_debug_tool(name: &str, arguments: &str, result: &str) {
    println!("{}", format!("  [tool] {name}").cyan());
    println!("{}", format!("  [args] {arguments}").dim());
    println!("{}", format!("  [result] {}", debug_preview(result)).dim());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {message}").red());
}

/// Escape newlines and cap at [`DEBUG_RESULT_CHARS`] characters.
pub fn debug_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(DEBUG_RESULT_CHARS).collect();
    if text.chars().nth(DEBUG_RESULT_CHARS).is_some() {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
