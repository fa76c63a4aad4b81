//! Subprocess execution shared by the tool adapters.

use crate::errors::RunnerError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Renders a command line for logs and error messages.
pub fn describe(command: &Command) -> String {
    let std_command = command.as_std();
    let mut parts = vec![std_command.get_program().to_string_lossy().into_owned()];
    parts.extend(
        std_command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned()),
    );
    parts.join(" ")
}

/// Runs `command` to completion and returns its stdout.
///
/// The child is killed when the returned future is dropped, so wrapping the
/// call in a timeout also stops the process. A non-zero exit becomes
/// [`RunnerError::CommandFailed`] carrying stderr (or stdout when the tool
/// reports errors there).
pub async fn run_command(mut command: Command) -> Result<Vec<u8>, RunnerError> {
    let command_line = describe(&command);
    debug!(command = %command_line, "running external tool");

    command.stdin(Stdio::null()).kill_on_drop(true);
    let output = command.output().await.map_err(|source| RunnerError::Spawn {
        command: command_line.clone(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(RunnerError::CommandFailed {
            command: command_line,
            status: output.status.to_string(),
            stderr: detail,
        });
    }

    debug!(command = %command_line, bytes = output.stdout.len(), "external tool finished");
    Ok(output.stdout)
}
