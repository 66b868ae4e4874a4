//! Runs OS tools for the command based strategies.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::ProcessError;

/// Runs `program` with `args` and returns its stdout.
///
/// Fails when the command cannot be spawned, does not finish within `timeout`,
/// exits with a failure status or writes anything to stderr. When stderr is
/// present it is used as the error message.
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ProcessError> {
    debug!(program, ?args, "running command");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ProcessError::Timeout {
            program: program.to_string(),
            after: timeout,
        })??;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if !output.status.success() || !stderr.is_empty() {
        let message = if stderr.is_empty() {
            format!("{} command failed: {}", program, output.status)
        } else {
            stderr.to_string()
        };
        return Err(ProcessError::Subprocess {
            program: program.to_string(),
            message,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
