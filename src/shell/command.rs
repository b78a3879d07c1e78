//! Shell command execution.
//!
//! Every interaction with the package and service managers goes through
//! [`Runner`]: a blocking, synchronous executor that runs a command either as
//! the invoking user or with elevated privileges and captures its output.
//! There is no retry and no timeout; a hung subprocess hangs the caller.

use crate::error::{CabinError, Result};
use std::process::Command;

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Callback invoked with exit code and error output when a command fails.
pub type FailureCallback<'a> = &'a mut dyn FnMut(Option<i32>, &str);

/// Executes shell commands on behalf of the service backends.
pub trait Runner {
    /// Run a command as the invoking user, capturing output.
    fn run(&self, command: &str) -> Result<CommandResult>;

    /// Run a command with elevated privileges.
    fn run_elevated(&self, command: &str) -> Result<CommandResult>;

    /// Run as the invoking user; report failures to `on_failure` and return
    /// whatever stdout was captured.
    fn run_or(&self, command: &str, on_failure: FailureCallback) -> String {
        match self.run(command) {
            Ok(result) => {
                if !result.success {
                    on_failure(result.exit_code, &result.stderr);
                }
                result.stdout
            }
            Err(_) => {
                on_failure(None, "");
                String::new()
            }
        }
    }

    /// Elevated variant of [`Runner::run_or`].
    fn run_elevated_or(&self, command: &str, on_failure: FailureCallback) -> String {
        match self.run_elevated(command) {
            Ok(result) => {
                if !result.success {
                    on_failure(result.exit_code, &result.stderr);
                }
                result.stdout
            }
            Err(_) => {
                on_failure(None, "");
                String::new()
            }
        }
    }

    /// Run and log failures at debug level instead of surfacing them.
    fn quietly(&self, command: &str) {
        if let Ok(result) = self.run(command) {
            if !result.success {
                tracing::debug!(
                    "command '{}' exited with {:?}: {}",
                    command,
                    result.exit_code,
                    result.stderr.trim()
                );
            }
        }
    }
}

/// Production [`Runner`] backed by `/bin/sh`.
pub struct ShellRunner;

impl Runner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandResult> {
        execute(command)
    }

    fn run_elevated(&self, command: &str) -> Result<CommandResult> {
        if super::platform::is_elevated() {
            execute(command)
        } else {
            execute(&format!("sudo {}", command))
        }
    }
}

fn execute(command: &str) -> Result<CommandResult> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|_| CabinError::CommandFailed {
            command: command.to_string(),
            code: None,
        })?;

    Ok(CommandResult {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_successful_command() {
        let result = ShellRunner.run("echo hello").unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn run_failing_command() {
        let result = ShellRunner.run("exit 1").unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn run_captures_stderr() {
        let result = ShellRunner.run("echo oops >&2").unwrap();

        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn run_or_returns_stdout_on_success() {
        let mut called = false;
        let stdout = ShellRunner.run_or("echo fine", &mut |_, _| called = true);

        assert!(stdout.contains("fine"));
        assert!(!called);
    }

    #[test]
    fn run_or_invokes_callback_on_failure() {
        let mut seen: Option<(Option<i32>, String)> = None;
        ShellRunner.run_or("echo broken >&2; exit 3", &mut |code, err| {
            seen = Some((code, err.to_string()));
        });

        let (code, err) = seen.expect("callback should fire");
        assert_eq!(code, Some(3));
        assert!(err.contains("broken"));
    }

    #[test]
    fn quietly_swallows_failures() {
        ShellRunner.quietly("exit 1");
    }
}
