//! Core configuration types
//!
//! This module defines the data structures that represent a rinvoke.yml
//! configuration file. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.

use crate::config::interpolate::interpolate;
use crate::error::{ConfigError, Result};
use crate::runner::RunOptions;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Program name shown in usage and task help, in place of the binary name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Task resolution and execution settings
    pub tasks: TaskSettings,

    /// Default options for shell commands
    pub run: RunSettings,

    /// Extra environment for commands; values may reference `${VAR}`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// dotenv file loaded before `env`, relative to the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// File the project configuration was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Settings under `tasks:`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Display `snake_case` names as `kebab-case`
    pub auto_dash_names: bool,

    /// Run each task at most once per invocation
    pub dedupe: bool,

    /// Stop at the first failing task
    pub fail_fast: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        TaskSettings {
            auto_dash_names: true,
            dedupe: true,
            fail_fast: true,
        }
    }
}

/// Settings under `run:`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSettings {
    pub echo: bool,
    pub pty: bool,
    pub hide: bool,
    pub warn: bool,

    /// Interpreter commands are passed to (e.g., ["bash", "-c"])
    pub shell: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            echo: false,
            pty: false,
            hide: false,
            warn: false,
            shell: vec!["sh".to_string(), "-c".to_string()],
        }
    }
}

impl RunSettings {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            echo: self.echo,
            pty: self.pty,
            hide: self.hide,
            warn: self.warn,
        }
    }
}

impl Config {
    /// Directory relative paths in the configuration are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.source
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Environment passed to commands
    ///
    /// The env file is read first; `env` entries are then interpolated
    /// against those values and the process environment.
    pub fn environment(&self) -> Result<HashMap<String, String>> {
        let mut vars = HashMap::new();

        if let Some(file) = &self.env_file {
            let path = self.base_dir().join(file);
            let entries = dotenvy::from_path_iter(&path).map_err(|e| ConfigError::EnvFile {
                path: path.clone(),
                error: e.to_string(),
            })?;
            for entry in entries {
                let (key, value) = entry.map_err(|e| ConfigError::EnvFile {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
                vars.insert(key, value);
            }
        }

        for (key, raw) in &self.env {
            let value = interpolate(raw, |name| {
                vars.get(name).cloned().or_else(|| env::var(name).ok())
            })?;
            vars.insert(key.clone(), value);
        }

        Ok(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RinvokeError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.tasks.auto_dash_names);
        assert!(config.tasks.dedupe);
        assert!(config.tasks.fail_fast);
        assert_eq!(config.run.shell, vec!["sh", "-c"]);
        assert_eq!(config.run.options(), RunOptions::default());
    }

    #[test]
    fn test_environment_reads_env_file_relative_to_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "PROJECT=monorepo\n").unwrap();

        let mut config = Config {
            env_file: Some(PathBuf::from(".env")),
            source: Some(dir.path().join("rinvoke.yml")),
            ..Config::default()
        };
        config
            .env
            .insert("IMAGE".to_string(), "gcr.io/${PROJECT}/api".to_string());

        let vars = config.environment().unwrap();
        assert_eq!(vars["PROJECT"], "monorepo");
        assert_eq!(vars["IMAGE"], "gcr.io/monorepo/api");
    }

    #[test]
    fn test_environment_missing_env_file() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            env_file: Some(PathBuf::from("missing.env")),
            source: Some(dir.path().join("rinvoke.yml")),
            ..Config::default()
        };
        let err = config.environment().unwrap_err();
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_environment_undefined_variable() {
        let mut config = Config::default();
        config.env.insert(
            "X".to_string(),
            "${RINVOKE_SURELY_UNDEFINED_VARIABLE}".to_string(),
        );
        let err = config.environment().unwrap_err();
        assert!(matches!(err, RinvokeError::Interpolation(_)));
        assert!(err.is_resolution_error());
    }
}
