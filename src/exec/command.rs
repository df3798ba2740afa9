// src/exec/command.rs

//! Bounded, non-interactive command execution.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::exec::locator::ToolchainLocator;
use crate::exec::terminate::terminate_in_background;
use crate::types::ExecutionResult;

/// One command to run to completion or timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Full command line, interpreted by the platform shell.
    pub command_line: String,
    pub timeout: Duration,
    pub working_dir: Option<PathBuf>,
}

impl ExecutionRequest {
    /// A zero timeout is raised to one millisecond.
    pub fn new(command_line: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            command_line: command_line.into(),
            timeout: Duration::from_millis(timeout_ms.max(1)),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Runs a single command with no stdin, captures all of stdout/stderr, and
/// resolves exactly once: either when the process exits or when the timeout
/// fires, whichever comes first.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    locator: ToolchainLocator,
    termination_grace: Duration,
}

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CommandExecutor {
    pub fn new(locator: ToolchainLocator, termination_grace: Duration) -> Self {
        Self {
            locator,
            termination_grace,
        }
    }

    /// Execute the request. Never fails: every outcome is an
    /// [`ExecutionResult`].
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let command_line = self.locator.rewrite_command_line(&request.command_line);
        let timeout_ms = request.timeout.as_millis() as u64;

        info!(cmd = %command_line, timeout_ms, "starting command");

        let mut cmd = shell_command(&command_line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(cmd = %command_line, error = %e, "failed to spawn command");
                return ExecutionResult::spawn_failed(&e);
            }
        };

        // The timeout future owns the race: if capture finishes first the
        // timer is dropped; if the timer fires first the capture future is
        // dropped and its result can no longer be observed. Stopping the
        // child happens off the caller's path, so a child that ignores the
        // graceful signal cannot stretch the deadline.
        let outcome = tokio::time::timeout(request.timeout, capture(&mut child)).await;
        match outcome {
            Ok(Ok(captured)) => build_result(&command_line, captured),
            Ok(Err(e)) => {
                error!(cmd = %command_line, error = %e, "collecting command output failed");
                terminate_in_background(child, self.termination_grace);
                ExecutionResult::failed(
                    "",
                    "",
                    Some(format!("waiting for process of '{command_line}': {e}")),
                )
            }
            Err(_) => {
                warn!(cmd = %command_line, timeout_ms, "command timed out; terminating");
                terminate_in_background(child, self.termination_grace);
                ExecutionResult::timed_out()
            }
        }
    }
}

/// Build a shell command appropriate for the platform.
///
/// cmd.exe does its own quote parsing, so the line is passed verbatim. With
/// `/S` the outer pair of quotes is always stripped and everything inside,
/// including quoted paths, reaches cmd untouched.
#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut c = Command::new("cmd");
    c.raw_arg(format!("/S /C \"{command_line}\""));
    c
}

/// Build a shell command appropriate for the platform.
///
/// The shell leads a fresh process group so termination reaches every
/// process the command line starts.
#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut c = Command::new("sh");
    c.arg("-c").arg(command_line).process_group(0);
    c
}

/// Wait for exit while draining both pipes, so a chatty child never blocks
/// on a full pipe buffer.
async fn capture(child: &mut Child) -> io::Result<Captured> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) =
        tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr));

    Ok(Captured {
        status: status?,
        stdout: stdout?,
        stderr: stderr?,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn build_result(command_line: &str, captured: Captured) -> ExecutionResult {
    let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();
    let code = captured.status.code().unwrap_or(-1);

    info!(
        cmd = %command_line,
        exit_code = code,
        success = captured.status.success(),
        "command exited"
    );

    if captured.status.success() {
        ExecutionResult::succeeded(stdout, stderr)
    } else {
        let message = failure_message(command_line, captured.status, &stderr);
        ExecutionResult::failed(stdout, stderr, Some(message))
    }
}

fn failure_message(command_line: &str, status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("Command failed ({status}): {command_line}")
    } else {
        format!("Command failed ({status}): {command_line}\n{stderr}")
    }
}
