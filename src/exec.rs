//! Thin seam over external utilities so capture and speech can run against fakes.

use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Short description of a failed run for error messages.
    pub fn failure_detail(&self) -> String {
        let code = self
            .code
            .map_or_else(|| "signal".to_string(), |code| code.to_string());
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit status {code}")
        } else {
            format!("exit status {code}: {stderr}")
        }
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion. `Err` only when it could not be started.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

impl<F> CommandRunner for F
where
    F: Fn(&str, &[String]) -> io::Result<CommandOutput> + Send + Sync,
{
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self(program, args)
    }
}

/// Runs real processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        debug!(program, ?args, "spawning");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
