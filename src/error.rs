//! Error types for rinvoke

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rinvoke operations
pub type Result<T> = std::result::Result<T, RinvokeError>;

/// Main error type for rinvoke
#[derive(Error, Debug)]
pub enum RinvokeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task lookup and dependency resolution errors
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// Flag binding errors
    #[error("{0}")]
    Bind(#[from] BindError),

    /// Task execution errors
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Program-level command line errors (also carries --help/--version output)
    #[error("{0}")]
    Cli(#[from] clap::Error),
}

impl RinvokeError {
    /// Whether this error was raised before any task body ran
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            RinvokeError::Registry(_)
                | RinvokeError::Bind(_)
                | RinvokeError::Config(_)
                | RinvokeError::Interpolation(_)
        )
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Failed to load env file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },
}

/// Task registry and dependency resolution errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No task named '{0}'")]
    UnknownTask(String),

    #[error("Task '{0}' is already defined in this namespace")]
    DuplicateTask(String),

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("'{new}' cannot be the default task because '{existing}' already is")]
    ConflictingDefault { existing: String, new: String },
}

/// Errors raised while binding command-line flags to task parameters
#[derive(Error, Debug)]
pub enum BindError {
    #[error("Invalid value '{value}' for '{param}': expected {expected}")]
    TypeMismatch {
        param: String,
        value: String,
        expected: &'static str,
    },

    #[error("No such option: {0}")]
    UnknownOption(String),

    #[error("Option '{0}' needs a value")]
    MissingValue(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A task body failed; carries the step that failed
    #[error("Task '{task}' failed (step {position} of {total}): {source:#}")]
    Task {
        task: String,
        position: usize,
        total: usize,
        source: anyhow::Error,
    },

    #[error("Command '{command}' failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Specialized result type for flag binding
pub type BindResult<T> = std::result::Result<T, BindError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
