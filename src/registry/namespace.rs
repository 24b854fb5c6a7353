//! Namespace trees
//!
//! A [`Namespace`] maps names to tasks and to nested namespaces. Modules of
//! tasks are composed by merging their namespaces or nesting them under a
//! name; collisions are rejected at composition time.

use crate::error::{RegistryError, RegistryResult};
use crate::registry::naming::canonical;
use crate::registry::TaskDefinition;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A tree of tasks
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    tasks: BTreeMap<String, Arc<TaskDefinition>>,
    children: BTreeMap<String, Namespace>,
    default: Option<String>,
}

/// A task found by walking a namespace tree
#[derive(Debug, Clone)]
pub struct NamespaceEntry {
    /// Canonical path segments, ending with the task's key
    pub path: Vec<String>,
    pub task: Arc<TaskDefinition>,
    /// Whether the task is its namespace's default
    pub is_default: bool,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a namespace from a list of tasks, under their declared names
    pub fn from_tasks<I>(tasks: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = Arc<TaskDefinition>>,
    {
        let mut ns = Namespace::new();
        for task in tasks {
            ns.add_task(task)?;
        }
        Ok(ns)
    }

    /// Add a task under its declared name
    pub fn add_task(&mut self, task: Arc<TaskDefinition>) -> RegistryResult<()> {
        let name = task.name.clone();
        self.add_task_as(task, &name)
    }

    /// Add a task under a different public name
    pub fn add_task_as(&mut self, task: Arc<TaskDefinition>, alias: &str) -> RegistryResult<()> {
        let key = canonical(alias);
        self.ensure_free(&key)?;

        if task.is_default {
            self.set_default_key(&key)?;
        }
        self.tasks.insert(key, task);
        Ok(())
    }

    /// Nest another namespace under `name`
    pub fn add_namespace(&mut self, name: &str, namespace: Namespace) -> RegistryResult<()> {
        let key = canonical(name);
        self.ensure_free(&key)?;
        self.children.insert(key, namespace);
        Ok(())
    }

    /// Merge another namespace's entries into this level
    pub fn merge(&mut self, other: Namespace) -> RegistryResult<()> {
        for key in other.tasks.keys().chain(other.children.keys()) {
            self.ensure_free(key)?;
        }
        if let Some(default) = &other.default {
            self.set_default_key(default)?;
        }

        self.tasks.extend(other.tasks);
        self.children.extend(other.children);
        Ok(())
    }

    /// Make an existing task this namespace's default
    pub fn set_default(&mut self, name: &str) -> RegistryResult<()> {
        let key = canonical(name);
        if !self.tasks.contains_key(&key) {
            return Err(RegistryError::UnknownTask(name.to_string()));
        }
        self.set_default_key(&key)
    }

    pub fn task(&self, name: &str) -> Option<&Arc<TaskDefinition>> {
        self.tasks.get(&canonical(name))
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.children.get(&canonical(name))
    }

    pub(crate) fn namespace_mut_or_insert(&mut self, key: &str) -> RegistryResult<&mut Namespace> {
        if self.tasks.contains_key(key) {
            return Err(RegistryError::DuplicateTask(key.to_string()));
        }
        Ok(self.children.entry(key.to_string()).or_default())
    }

    /// Key of the default task, if any
    pub fn default_task(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.children.is_empty()
    }

    /// Find a task by canonical path segments
    ///
    /// A path naming a namespace resolves to that namespace's default task.
    pub fn lookup(&self, segments: &[String]) -> Option<NamespaceEntry> {
        let mut prefix = Vec::new();
        self.lookup_inner(segments, &mut prefix)
    }

    fn lookup_inner(&self, segments: &[String], prefix: &mut Vec<String>) -> Option<NamespaceEntry> {
        match segments {
            [] => {
                let key = self.default.as_ref()?;
                let task = self.tasks.get(key)?;
                prefix.push(key.clone());
                Some(NamespaceEntry {
                    path: prefix.clone(),
                    task: Arc::clone(task),
                    is_default: true,
                })
            }
            [last] if self.tasks.contains_key(last) => {
                let task = self.tasks.get(last)?;
                prefix.push(last.clone());
                Some(NamespaceEntry {
                    path: prefix.clone(),
                    task: Arc::clone(task),
                    is_default: self.default.as_deref() == Some(last.as_str()),
                })
            }
            [first, rest @ ..] => {
                let child = self.children.get(first)?;
                prefix.push(first.clone());
                child.lookup_inner(rest, prefix)
            }
        }
    }

    /// Every task in the tree, depth-first in name order
    pub fn entries(&self) -> Vec<NamespaceEntry> {
        let mut out = Vec::new();
        self.collect_entries(&mut Vec::new(), &mut out);
        out
    }

    fn collect_entries(&self, prefix: &mut Vec<String>, out: &mut Vec<NamespaceEntry>) {
        for (key, task) in &self.tasks {
            let mut path = prefix.clone();
            path.push(key.clone());
            out.push(NamespaceEntry {
                path,
                task: Arc::clone(task),
                is_default: self.default.as_deref() == Some(key.as_str()),
            });
        }
        for (key, child) in &self.children {
            prefix.push(key.clone());
            child.collect_entries(prefix, out);
            prefix.pop();
        }
    }

    fn ensure_free(&self, key: &str) -> RegistryResult<()> {
        if self.tasks.contains_key(key) || self.children.contains_key(key) {
            return Err(RegistryError::DuplicateTask(key.to_string()));
        }
        Ok(())
    }

    fn set_default_key(&mut self, key: &str) -> RegistryResult<()> {
        match &self.default {
            Some(existing) if existing != key => Err(RegistryError::ConflictingDefault {
                existing: existing.clone(),
                new: key.to_string(),
            }),
            _ => {
                self.default = Some(key.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Arc<TaskDefinition> {
        TaskDefinition::builder(name).build()
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let mut ns = Namespace::new();
        ns.add_task(task("clean")).unwrap();
        let err = ns.add_task(task("clean")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTask(ref name) if name == "clean"));
    }

    #[test]
    fn test_hyphen_and_underscore_collide() {
        let mut ns = Namespace::new();
        ns.add_task(task("hello_world")).unwrap();
        assert!(ns.add_task_as(task("other"), "hello-world").is_err());
    }

    #[test]
    fn test_alias_avoids_collision() {
        let mut ns = Namespace::new();
        ns.add_task(task("demo")).unwrap();
        ns.add_task_as(task("demo"), "dependencies_demo").unwrap();
        assert!(ns.task("dependencies-demo").is_some());
    }

    #[test]
    fn test_merge_conflict_fails() {
        let mut a = Namespace::from_tasks([task("demo")]).unwrap();
        let b = Namespace::from_tasks([task("demo"), task("other")]).unwrap();
        assert!(a.merge(b).is_err());
        // nothing from the failed merge was added
        assert!(a.task("other").is_none());
    }

    #[test]
    fn test_task_and_namespace_share_one_name_space() {
        let mut ns = Namespace::from_tasks([task("build")]).unwrap();
        assert!(ns.add_namespace("build", Namespace::new()).is_err());
    }

    #[test]
    fn test_lookup_nested_and_default() {
        let deps = Namespace::from_tasks([
            task("clean"),
            TaskDefinition::builder("build").default_task().build(),
        ])
        .unwrap();
        let mut root = Namespace::new();
        root.add_namespace("dependencies", deps).unwrap();

        let entry = root.lookup(&path(&["dependencies", "clean"])).unwrap();
        assert_eq!(entry.path, path(&["dependencies", "clean"]));
        assert!(!entry.is_default);

        let entry = root.lookup(&path(&["dependencies"])).unwrap();
        assert_eq!(entry.task.name, "build");
        assert!(entry.is_default);

        assert!(root.lookup(&path(&["dependencies", "missing"])).is_none());
    }

    #[test]
    fn test_second_default_conflicts() {
        let mut ns = Namespace::new();
        ns.add_task(TaskDefinition::builder("a").default_task().build())
            .unwrap();
        let err = ns
            .add_task(TaskDefinition::builder("b").default_task().build())
            .unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingDefault { .. }));
    }

    #[test]
    fn test_entries_are_ordered() {
        let mut root = Namespace::from_tasks([task("zeta"), task("alpha")]).unwrap();
        root.add_namespace("mid", Namespace::from_tasks([task("inner")]).unwrap())
            .unwrap();
        let names: Vec<String> = root.entries().iter().map(|e| e.path.join(".")).collect();
        assert_eq!(names, vec!["alpha", "zeta", "mid.inner"]);
    }
}
