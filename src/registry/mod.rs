//! Task registry
//!
//! This module holds task definitions, the namespace tree they live in, and
//! the naming rules used to look them up from the command line.

pub mod namespace;
pub mod naming;
pub mod task;

pub use namespace::*;
pub use naming::NameStyle;
pub use task::*;

use crate::error::{RegistryError, RegistryResult};
use naming::{join_path, split_path};
use std::sync::Arc;

/// A task resolved from a (possibly qualified) name
#[derive(Debug, Clone)]
pub struct ResolvedTask {
    /// Canonical path segments, ending with the task's key
    pub path: Vec<String>,
    pub task: Arc<TaskDefinition>,
}

impl ResolvedTask {
    /// Qualified display name
    pub fn display_name(&self, style: &NameStyle) -> String {
        join_path(style, &self.path)
    }
}

/// One line of a task listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListing {
    pub name: String,
    pub summary: Option<String>,
    /// Set when the task is the default of its namespace
    pub default_for: Option<String>,
}

/// Registry of every task reachable from a root namespace
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    root: Namespace,
    style: NameStyle,
}

impl TaskRegistry {
    pub fn new(style: NameStyle) -> Self {
        TaskRegistry {
            root: Namespace::new(),
            style,
        }
    }

    pub fn from_namespace(root: Namespace, style: NameStyle) -> Self {
        TaskRegistry { root, style }
    }

    pub fn style(&self) -> &NameStyle {
        &self.style
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Add a task to the root namespace
    pub fn register(&mut self, task: Arc<TaskDefinition>) -> RegistryResult<()> {
        self.root.add_task(task)
    }

    /// Add a task to a nested namespace, creating it if needed
    pub fn register_in(&mut self, namespace: &str, task: Arc<TaskDefinition>) -> RegistryResult<()> {
        let mut ns = &mut self.root;
        for segment in split_path(namespace) {
            ns = ns.namespace_mut_or_insert(&segment)?;
        }
        ns.add_task(task)
    }

    /// Resolve a qualified name from the root
    pub fn resolve(&self, name: &str) -> RegistryResult<ResolvedTask> {
        let segments = split_path(name);
        if segments.is_empty() {
            return Err(RegistryError::UnknownTask(name.to_string()));
        }

        self.root
            .lookup(&segments)
            .map(|entry| ResolvedTask {
                path: entry.path,
                task: entry.task,
            })
            .ok_or_else(|| RegistryError::UnknownTask(name.to_string()))
    }

    /// Resolve a name relative to `scope`, falling back to the root
    pub fn resolve_from(&self, scope: &[String], name: &str) -> RegistryResult<ResolvedTask> {
        let relative = split_path(name);
        for depth in (1..=scope.len()).rev() {
            let mut segments = scope[..depth].to_vec();
            segments.extend(relative.iter().cloned());
            if let Some(entry) = self.root.lookup(&segments) {
                return Ok(ResolvedTask {
                    path: entry.path,
                    task: entry.task,
                });
            }
        }
        self.resolve(name)
    }

    /// The root namespace's default task
    pub fn default_task(&self) -> Option<ResolvedTask> {
        self.root.lookup(&[]).map(|entry| ResolvedTask {
            path: entry.path,
            task: entry.task,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Every task, with display names, in listing order
    pub fn list(&self) -> Vec<TaskListing> {
        self.root
            .entries()
            .into_iter()
            .map(|entry| {
                let default_for = entry.is_default.then(|| {
                    let scope = &entry.path[..entry.path.len() - 1];
                    if scope.is_empty() {
                        String::new()
                    } else {
                        join_path(&self.style, scope)
                    }
                });
                TaskListing {
                    name: join_path(&self.style, &entry.path),
                    summary: entry.task.summary().map(str::to_string),
                    default_for,
                }
            })
            .collect()
    }
}
