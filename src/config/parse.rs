//! Configuration file parsing and discovery
//!
//! Two layers are read: the user configuration from the platform config
//! directory, then the project `rinvoke.yml` found by searching upward from
//! the current directory. Project values win key by key.

use crate::config::schema::validate_config;
use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, Result};
use directories::ProjectDirs;
use serde_yaml::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["rinvoke.yml", "rinvoke.yaml"];

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Location of the per-user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rinvoke").map(|dirs| dirs.config_dir().join("config.yml"))
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config> {
    let value = parse_value(yaml)?;
    let config: Config = serde_yaml::from_value(value)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let mut config = parse_config(&read_file(path)?)?;
    config.source = Some(path.to_path_buf());
    Ok(config)
}

/// Load the layered configuration
///
/// `explicit` replaces discovery and must exist. Without it, a missing
/// project file simply leaves the defaults in place.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let project_path = match explicit {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file().ok(),
    };
    let user_path = user_config_path().filter(|path| path.is_file());

    load_layers(user_path.as_deref(), project_path.as_deref())
}

/// Merge the user layer under the project layer
pub fn load_layers(user: Option<&Path>, project: Option<&Path>) -> Result<Config> {
    let mut merged = Value::Mapping(Default::default());

    for path in [user, project].into_iter().flatten() {
        debug!(path = %path.display(), "loading config layer");
        let layer = parse_value(&read_file(path)?)?;
        merge_values(&mut merged, layer);
    }

    let mut config: Config = serde_yaml::from_value(merged)?;
    validate_config(&config)?;
    config.source = project.map(Path::to_path_buf);
    Ok(config)
}

/// Recursively merge `overlay` into `base`; mappings merge, anything else replaces
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn read_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// An empty document parses as an empty mapping
fn parse_value(yaml: &str) -> Result<Value> {
    let value: Value = serde_yaml::from_str(yaml)?;
    Ok(match value {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    })
}
