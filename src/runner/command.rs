//! Command execution
//!
//! Task bodies run shell commands through the [`CommandRunner`] capability
//! held by their [`Context`](crate::runner::Context). [`ShellRunner`] is the
//! process-backed implementation.

use crate::error::{ExecutionError, ExecutionResult};
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

/// Per-command execution options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Print the command before running it
    pub echo: bool,
    /// Attach the command directly to the terminal
    pub pty: bool,
    /// Capture output without mirroring it
    pub hide: bool,
    /// Return non-zero exits instead of failing
    pub warn: bool,
}

impl RunOptions {
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn pty(mut self, pty: bool) -> Self {
        self.pty = pty;
        self
    }

    pub fn hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }
}

/// Everything a runner needs to execute one command
#[derive(Debug, Clone)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
    pub working_dir: &'a Path,
    pub env: &'a HashMap<String, String>,
    pub options: RunOptions,
}

/// Result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: String,
    /// Exit code; `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes shell command strings
pub trait CommandRunner {
    fn run(&self, request: &CommandRequest<'_>) -> ExecutionResult<CommandOutput>;
}

/// Runs commands through a shell interpreter such as `sh -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    interpreter: Vec<String>,
}

impl ShellRunner {
    pub fn new(interpreter: Vec<String>) -> Self {
        ShellRunner { interpreter }
    }

    fn build(&self, request: &CommandRequest<'_>) -> StdCommand {
        let (program, interpreter_args) = match self.interpreter.split_first() {
            Some((program, args)) => (program.as_str(), args),
            None => ("sh", &[][..]),
        };

        // a bare interpreter name still gets `-c`
        let mut command = StdCommand::new(program);
        if interpreter_args.is_empty() {
            command.arg("-c");
        } else {
            command.args(interpreter_args);
        }
        command.arg(request.command);
        command.current_dir(request.working_dir);
        command.envs(request.env);
        command
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        ShellRunner::new(vec!["sh".to_string(), "-c".to_string()])
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, request: &CommandRequest<'_>) -> ExecutionResult<CommandOutput> {
        let options = request.options;
        if options.echo {
            println!("{}", request.command.bold());
        }
        debug!(command = request.command, dir = %request.working_dir.display(), "running command");

        let mut command = self.build(request);
        let spawn_error = |source| ExecutionError::Spawn {
            command: request.command.to_string(),
            source,
        };

        let output = if options.pty {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            let status = command.status().map_err(spawn_error)?;
            CommandOutput {
                command: request.command.to_string(),
                code: status.code(),
                ..CommandOutput::default()
            }
        } else {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            let output = command.output().map_err(spawn_error)?;
            let captured = CommandOutput {
                command: request.command.to_string(),
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            if !options.hide {
                mirror(&captured);
            }
            captured
        };

        if !output.success() && !options.warn {
            return Err(ExecutionError::CommandFailed {
                command: output.command,
                code: output.code,
            });
        }

        Ok(output)
    }
}

/// Replay captured output on our own stdout/stderr
fn mirror(output: &CommandOutput) {
    // broken pipes on our side are not the command's failure
    let _ = std::io::stdout().write_all(output.stdout.as_bytes());
    let _ = std::io::stderr().write_all(output.stderr.as_bytes());
}
