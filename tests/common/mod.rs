//! Common test utilities

use rinvoke::registry::{TaskBuilder, TaskDefinition};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Names of task bodies in the order they ran
pub type Trace = Arc<Mutex<Vec<String>>>;

/// Create a temporary directory with a rinvoke.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("rinvoke.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test config with an empty subdirectory next to it
pub fn create_test_config_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, config_path) = create_test_config(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, config_path, sub_dir)
}

pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

/// A task whose body appends its name to `trace`
pub fn traced(name: &str, trace: &Trace) -> TaskBuilder {
    let trace = Arc::clone(trace);
    let label = name.to_string();
    TaskDefinition::builder(name).body(move |_, _| {
        trace.lock().unwrap().push(label.clone());
        Ok(None)
    })
}

pub fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
