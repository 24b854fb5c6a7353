//! Demo task collections
//!
//! The `rinvoke` binary exposes these namespaces: `basics`, `params` and
//! `dependencies`, plus two root tasks. `tskmstr` backs the separate
//! `tskmstr` binary, a custom program built on the same machinery.

pub mod basics;
pub mod dependencies;
pub mod params;
pub mod tskmstr;

use crate::error::RegistryResult;
use crate::registry::{Namespace, TaskDefinition};

/// The root namespace of the `rinvoke` binary
pub fn namespace() -> RegistryResult<Namespace> {
    let demo = TaskDefinition::builder("demo")
        .doc("This is a test global task.")
        .body(|_, _| {
            println!("I am a global task.");
            Ok(None)
        })
        .build();

    let renamed = TaskDefinition::builder("_demo")
        .doc("This task shows how to change the task name.")
        .body(|_, _| {
            println!("I am named _demo but my task is called omed.");
            Ok(None)
        })
        .build();

    let mut ns = Namespace::new();
    ns.add_namespace("basics", basics::namespace()?)?;
    ns.add_namespace("params", params::namespace()?)?;
    ns.add_namespace("dependencies", dependencies::namespace()?)?;
    ns.add_task(demo)?;
    ns.add_task_as(renamed, "omed")?;
    Ok(ns)
}

/// A shell command that re-runs the current executable with `args`
pub(crate) fn self_command(args: &str) -> anyhow::Result<String> {
    let exe = std::env::current_exe()?;
    Ok(format!("\"{}\" {}", exe.display(), args))
}
