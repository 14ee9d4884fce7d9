//! Fresh-process execution probe.
//!
//! The execution tier must answer "would this tool work in a terminal
//! the user opens now?", so the probe spawns a new process whose PATH
//! is supplied explicitly (rebuilt from the store) instead of inheriting
//! whatever stale value this process started with. On Windows the
//! command goes through `powershell -NoProfile` so `.cmd` shims resolve
//! the way they do in a real shell.
//!
//! The probe blocks the worker thread up to a fixed timeout. A timeout
//! kills the child and reports as a verification failure, never as a
//! crash.

use crate::error::{PathmendError, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for the child to exit.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Captured output of a completed execution probe.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Exit code (None if terminated by a signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ExecutionOutput {
    /// Whether the probe exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run a version query in a fresh process with a bounded timeout.
///
/// `path_override` replaces the child's PATH entirely; `None` leaves
/// the inherited value (used when the store could not be read; the
/// probe still runs, its detail just notes the weaker guarantee).
pub fn run_version_query(
    command: &str,
    args: &[String],
    path_override: Option<&str>,
    timeout: Duration,
) -> Result<ExecutionOutput> {
    let mut cmd = build_command(command, args);
    if let Some(path) = path_override {
        cmd.env("PATH", path);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| PathmendError::ExecutionFailed {
        command: command.to_string(),
        message: format!("failed to spawn: {e}"),
    })?;

    // Drain pipes on separate threads so a chatty child can't fill the
    // pipe buffer and deadlock against our wait loop.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_handle = thread::spawn(move || read_to_string_lossy(stdout_pipe));
    let stderr_handle = thread::spawn(move || read_to_string_lossy(stderr_pipe));

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = stdout_handle.join().unwrap_or_default();
                let stderr = stderr_handle.join().unwrap_or_default();
                return Ok(ExecutionOutput {
                    exit_code: status.code(),
                    stdout,
                    stderr,
                    duration: start.elapsed(),
                });
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PathmendError::ExecutionTimeout {
                        command: command.to_string(),
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(WAIT_POLL);
            }
            Err(e) => {
                let _ = child.kill();
                return Err(PathmendError::ExecutionFailed {
                    command: command.to_string(),
                    message: format!("wait failed: {e}"),
                });
            }
        }
    }
}

/// Build the platform invocation for a version query.
///
/// On Windows the probe goes through PowerShell so `.cmd`/`.bat` shims
/// (npm-installed CLIs) resolve; `CreateProcess` alone only finds
/// `.exe`. Elsewhere the command is spawned directly.
fn build_command(command: &str, args: &[String]) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("powershell");
        cmd.arg("-NoProfile").arg("-Command").arg(format!(
            "$ErrorActionPreference = 'SilentlyContinue'; \
             $result = & {} {} 2>&1; \
             if ($LASTEXITCODE -eq 0) {{ Write-Output $result; exit 0 }} else {{ exit 1 }}",
            command,
            args.join(" ")
        ));
        cmd
    } else {
        let mut cmd = Command::new(command);
        cmd.args(args);
        cmd
    }
}

fn read_to_string_lossy(pipe: Option<impl Read>) -> String {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    String::from_utf8_lossy(&buffer).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn captures_output_of_successful_command() {
        let output = run_version_query(
            "echo",
            &["hello".to_string()],
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn reports_nonzero_exit_code() {
        let output = run_version_query(
            "sh",
            &["-c".to_string(), "exit 3".to_string()],
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_child_and_reports() {
        let err = run_version_query(
            "sleep",
            &["10".to_string()],
            None,
            Duration::from_millis(200),
        )
        .unwrap_err();
        assert!(matches!(err, PathmendError::ExecutionTimeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn missing_binary_reports_spawn_failure() {
        let err = run_version_query(
            "definitely-not-a-real-binary",
            &[],
            Some("/nonexistent"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, PathmendError::ExecutionFailed { .. }));
    }
}
