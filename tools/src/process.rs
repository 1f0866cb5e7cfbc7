//! Subprocess execution for the shell-backed tools.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::{ToolError, truncate_output};

/// Run `program` with `args` in `working_dir` and return its combined output.
///
/// Stdout comes first, then stderr. A non-zero exit that still printed
/// something is returned as output; a silent failure is an error. The child
/// is killed if the returned future is dropped, which is how the executor's
/// timeout stops it.
pub async fn run_command(
    program: &str,
    args: &[&str],
    working_dir: &Path,
    max_chars: usize,
) -> Result<String, ToolError> {
    tracing::debug!(program, ?args, "Spawning tool command");
    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool: program.to_string(),
            message: e.to_string(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = truncate_output(combined, max_chars);

    if !output.status.success() && combined.is_empty() {
        return Err(ToolError::ExecutionFailed {
            tool: program.to_string(),
            message: output.status.to_string(),
        });
    }
    Ok(combined)
}
