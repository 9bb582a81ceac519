//! External command execution.
//!
//! Thin wrapper over `std::process::Command` used to drive the external
//! silence-removal tool. Commands are logged before launch; output is
//! captured in full.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

/// Captured result of one external command.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Runs external commands synchronously.
#[derive(Debug, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `program` with `args`, optionally in `cwd`, capturing output.
    pub fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> io::Result<CommandOutput> {
        info!("$ {} {}", program, args.join(" "));

        let mut command = Command::new(program);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output()?;
        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };
        debug!(
            "{} exited with {:?} ({} bytes stdout)",
            program,
            result.exit_code,
            result.stdout.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_successful_command() {
        let runner = CommandRunner::new();
        let output = runner.run("echo", &["hello"], None).unwrap();

        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn reports_missing_program_as_io_error() {
        let runner = CommandRunner::new();
        let result = runner.run("autosplice-no-such-binary", &[], None);
        assert!(result.is_err());
    }

    #[test]
    fn reports_nonzero_exit_as_unsuccessful() {
        let runner = CommandRunner::new();
        let output = runner.run("sh", &["-c", "exit 3"], None).unwrap();

        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
    }
}
