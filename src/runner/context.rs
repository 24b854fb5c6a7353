//! Execution context for task running
//!
//! One context is created per invocation and shared by every step of the
//! plan, so state set by one task is visible to the next.

use crate::config::Config;
use crate::error::{ExecutionResult, Result};
use crate::runner::command::{CommandOutput, CommandRequest, CommandRunner, RunOptions, ShellRunner};
use crate::runner::scoped::CdGuard;
use colored::Colorize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// Execution context that tracks state during task execution
pub struct Context {
    /// Directory commands run in
    pub working_dir: PathBuf,

    /// Extra environment passed to every command
    pub env: HashMap<String, String>,

    /// Options used by [`Context::run`]
    pub run_options: RunOptions,

    /// Verbosity level
    pub verbosity: Verbosity,

    current_task: Option<String>,

    runner: Box<dyn CommandRunner>,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env: HashMap::new(),
            run_options: RunOptions::default(),
            verbosity: Verbosity::Normal,
            current_task: None,
            runner: Box::new(ShellRunner::default()),
        }
    }

    /// Create a context from loaded configuration
    ///
    /// Commands run in the directory holding the config file, or the current
    /// directory when there is none.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut ctx = Context::new();
        ctx.working_dir = config.base_dir();
        ctx.env = config.environment()?;
        ctx.run_options = config.run.options();
        ctx.runner = Box::new(ShellRunner::new(config.run.shell.clone()));
        Ok(ctx)
    }

    /// Replace the command runner
    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the default run options
    pub fn with_run_options(mut self, options: RunOptions) -> Self {
        self.run_options = options;
        self
    }

    /// Set environment variables
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Run a shell command with the context's default options
    pub fn run(&self, command: &str) -> ExecutionResult<CommandOutput> {
        self.run_with(command, self.run_options)
    }

    /// Run a shell command with explicit options
    pub fn run_with(&self, command: &str, options: RunOptions) -> ExecutionResult<CommandOutput> {
        self.print_debug(&format!("$ {}", command));
        self.runner.run(&CommandRequest {
            command,
            working_dir: &self.working_dir,
            env: &self.env,
            options,
        })
    }

    /// Run commands in `path` until the returned guard is dropped
    ///
    /// Relative paths are joined onto the current working directory.
    pub fn cd(&mut self, path: impl AsRef<Path>) -> CdGuard<'_> {
        let target = self.working_dir.join(path);
        CdGuard::new(self, target)
    }

    /// Name of the task whose body is running
    pub fn current_task(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    pub(crate) fn set_current_task(&mut self, name: Option<String>) {
        self.current_task = name;
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".green(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[ERROR]".red().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, task_name: &str) {
        self.print_debug(&format!("Running task: {}", task_name));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, task_name: &str) {
        self.print_debug(&format!("Task completed: {}", task_name));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert_eq!(ctx.run_options, RunOptions::default());
        assert!(ctx.env.is_empty());
        assert!(ctx.current_task().is_none());
    }

    #[test]
    fn test_context_env() {
        let mut ctx = Context::new();
        ctx.set_env("STAGE", "dev");
        assert_eq!(ctx.get_env("STAGE"), Some("dev"));
        assert_eq!(ctx.get_env("MISSING"), None);
    }

    #[test]
    fn test_run_uses_working_dir_and_options() {
        let runner = RecordingRunner::new();
        let log = runner.log();
        let ctx = Context::new()
            .with_working_dir(PathBuf::from("/srv/app"))
            .with_run_options(RunOptions::default().echo(true))
            .with_runner(runner);

        ctx.run("make").unwrap();
        ctx.run_with("make test", RunOptions::default().hide(true)).unwrap();

        let calls = log.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command, "make");
        assert_eq!(calls[0].working_dir, PathBuf::from("/srv/app"));
        assert!(calls[0].options.echo);
        assert!(calls[1].options.hide);
    }

    #[test]
    fn test_cd_restores_on_drop() {
        let runner = RecordingRunner::new();
        let log = runner.log();
        let mut ctx = Context::new()
            .with_working_dir(PathBuf::from("/repo"))
            .with_runner(runner);

        {
            let mut inner = ctx.cd("c01");
            inner.run("ls -rt").unwrap();
            {
                let nested = inner.cd("sub");
                nested.run("pwd").unwrap();
            }
            inner.run("ls").unwrap();
        }
        ctx.run("ls").unwrap();

        let dirs: Vec<PathBuf> = log.calls().into_iter().map(|c| c.working_dir).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/repo/c01"),
                PathBuf::from("/repo/c01/sub"),
                PathBuf::from("/repo/c01"),
                PathBuf::from("/repo"),
            ]
        );
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }
}
