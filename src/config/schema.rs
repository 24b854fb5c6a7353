//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Config, RunSettings};
use crate::error::{ConfigError, ConfigResult};
use std::collections::BTreeMap;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_run(&config.run)?;
    validate_env(&config.env)?;
    Ok(())
}

/// The shell must name an interpreter
fn validate_run(run: &RunSettings) -> ConfigResult<()> {
    match run.shell.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid(
            "run.shell must name an interpreter, e.g. [\"sh\", \"-c\"]".to_string(),
        )),
    }
}

/// Environment keys must be usable as variable names
fn validate_env(env: &BTreeMap<String, String>) -> ConfigResult<()> {
    for key in env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ConfigError::Invalid(format!(
                "Invalid environment variable name: '{}'",
                key
            )));
        }
    }
    Ok(())
}
