//! codequery CLI: a line-oriented REPL over a [`codequery_engine::Session`].
//!
//! ```text
//! main() -> init_tracing() -> Config::load() -> Session::from_config()
//!        -> loop { read line -> command | Session::chat() -> print answer }
//! ```
//!
//! Logs go to `<config dir>/logs/codequery.log`, never to the terminal.

mod display;
mod spinner;

use std::env;
use std::future::Future;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use codequery_config::{Config, config_dir, config_path, legacy_config_path};
use codequery_engine::Session;
use codequery_tools::ToolRegistry;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, stdin};
use tokio::signal::ctrl_c;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::spinner::Spinner;

const PROMPT: &str = "> ";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    Interrupted,
    Eof,
}

/// Wait for the next line, or for `interrupt` to fire first.
async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> io::Result<Input>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        biased;
        result = interrupt => {
            result?;
            Ok(Input::Interrupted)
        }
        line = lines.next_line() => Ok(line?.map_or(Input::Eof, Input::Line)),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    debug: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    for arg in args {
        match arg.as_str() {
            "--debug" => parsed.debug = true,
            "-h" | "--help" => parsed.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(parsed)
}

fn usage() -> String {
    format!(
        "Usage: codequery [--debug]\n\n{}",
        display::help_text(config_path().as_deref())
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file means no logs; stdout belongs to the REPL.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = config_dir() {
        candidates.push(dir.join("logs").join("codequery.log"));
    }
    candidates.push(PathBuf::from(".codequery").join("logs").join("codequery.log"));
    candidates
}

fn print_missing_key_help() {
    display::print_error("no API key configured");
    eprintln!();
    eprintln!("Set one of:");
    eprintln!("  export OPENAI_API_KEY=sk-...");
    match config_path() {
        Some(path) => eprintln!("  api_key = \"sk-...\"   in {}", path.display()),
        None => eprintln!("  api_key = \"sk-...\"   in ~/.config/codequery/config.toml"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            display::print_error(&message);
            eprintln!("{}", usage());
            return Ok(ExitCode::FAILURE);
        }
    };
    if args.help {
        println!("{}", usage());
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing();

    let (config, config_error) = Config::load();
    if let Some(e) = config_error {
        display::print_error(&format!(
            "{e}; using defaults and environment (the config file is TOML, not JSON)"
        ));
    }
    if let Some(legacy) = legacy_config_path() {
        tracing::warn!(path = %legacy.display(), "Ignoring legacy JSON config");
        display::print_error(&display::legacy_config_note(&legacy));
    }
    if config.api_key.is_none() {
        print_missing_key_help();
        return Ok(ExitCode::FAILURE);
    }

    let working_dir = env::current_dir().context("failed to read current directory")?;
    let mut session = Session::from_config(&config, &working_dir)?;
    display::print_banner(session.api_config().model(), session.api_config().host());

    run_repl(&mut session, args.debug).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_repl(session: &mut Session, debug: bool) -> Result<()> {
    let summaries = ToolRegistry::with_builtins();
    let spinner = Spinner::new("Thinking...");
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        print!("{PROMPT}");
        stdout().flush()?;

        // Ctrl-C at the prompt drops the current line.
        let line = match next_input(&mut lines, ctrl_c()).await? {
            Input::Line(line) => line,
            Input::Interrupted => {
                println!();
                continue;
            }
            Input::Eof => {
                println!();
                println!("Goodbye!");
                return Ok(());
            }
        };
        let input = line.trim();
        match input {
            "" => continue,
            "exit" | "quit" => {
                println!("Goodbye!");
                return Ok(());
            }
            "clear" | "reset" => {
                session.reset();
                println!("Conversation cleared.");
                continue;
            }
            "help" => {
                println!("{}", display::help_text(config_path().as_deref()));
                continue;
            }
            _ => {}
        }

        if !debug {
            spinner.start();
        }
        let chat = session.chat(input, |name, arguments, result| {
            if debug {
                display::print_debug_tool(name, arguments, result);
            } else {
                spinner.stop();
                display::print_tool_line(name, &summaries.summary(name, arguments));
                spinner.start();
            }
        });
        // A turn cut short could leave tool calls without results in the
        // history, so Ctrl-C during a request quits instead.
        let result = tokio::select! {
            result = chat => result,
            _ = ctrl_c() => {
                spinner.stop();
                println!();
                println!("Interrupted. Goodbye!");
                return Ok(());
            }
        };
        spinner.stop();

        match result {
            Ok(answer) => {
                println!();
                println!("{answer}");
                println!();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat failed");
                display::print_error(&e.to_string());
            }
        }
    }
}
