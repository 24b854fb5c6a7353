//! Testing utilities for task collections.
//!
//! - [`RecordingRunner`]: a [`CommandRunner`] that records every command
//!   instead of running it, with scripted exit codes and output
//! - [`CommandLog`]: a handle for inspecting what was recorded after the
//!   runner has been moved into a [`Context`](crate::runner::Context)

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{CommandOutput, CommandRequest, CommandRunner, RunOptions};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub working_dir: PathBuf,
    pub env: HashMap<String, String>,
    pub options: RunOptions,
}

#[derive(Debug, Default)]
struct Script {
    /// Command substring -> exit code
    exit_codes: Vec<(String, i32)>,
    /// Command substring -> stdout
    outputs: Vec<(String, String)>,
}

/// Shared view of the commands a [`RecordingRunner`] has seen.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    calls: Arc<Mutex<Vec<RecordedCommand>>>,
}

impl CommandLog {
    /// Every recorded command, in order.
    pub fn calls(&self) -> Vec<RecordedCommand> {
        lock(&self.calls).clone()
    }

    /// Just the command strings, in order.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.command.clone()).collect()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

/// A command runner that never spawns a process.
///
/// # Example
///
/// ```
/// use rinvoke::runner::Context;
/// use rinvoke::testing::RecordingRunner;
///
/// let runner = RecordingRunner::new().fail_on("deploy", 2);
/// let log = runner.log();
/// let ctx = Context::new().with_runner(runner);
///
/// ctx.run("make build").unwrap();
/// assert!(ctx.run("make deploy").is_err());
/// assert_eq!(log.commands(), vec!["make build", "make deploy"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingRunner {
    log: CommandLog,
    script: Script,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `pattern` exit with `code`.
    pub fn fail_on(mut self, pattern: impl Into<String>, code: i32) -> Self {
        self.script.exit_codes.push((pattern.into(), code));
        self
    }

    /// Commands containing `pattern` print `stdout`.
    pub fn respond(mut self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.script.outputs.push((pattern.into(), stdout.into()));
        self
    }

    /// A handle that stays valid after the runner is moved into a context.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, request: &CommandRequest<'_>) -> ExecutionResult<CommandOutput> {
        lock(&self.log.calls).push(RecordedCommand {
            command: request.command.to_string(),
            working_dir: request.working_dir.to_path_buf(),
            env: request.env.clone(),
            options: request.options,
        });

        let code = scripted(&self.script.exit_codes, request.command)
            .copied()
            .unwrap_or(0);
        let stdout = scripted(&self.script.outputs, request.command)
            .cloned()
            .unwrap_or_default();

        let output = CommandOutput {
            command: request.command.to_string(),
            code: Some(code),
            stdout,
            stderr: String::new(),
        };
        if !output.success() && !request.options.warn {
            return Err(ExecutionError::CommandFailed {
                command: output.command,
                code: output.code,
            });
        }
        Ok(output)
    }
}

/// First scripted value whose pattern occurs in `command`
fn scripted<'a, V>(entries: &'a [(String, V)], command: &str) -> Option<&'a V> {
    entries
        .iter()
        .find(|(pattern, _)| command.contains(pattern.as_str()))
        .map(|(_, value)| value)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
