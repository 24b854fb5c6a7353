//! Recursive pre-task chains
//!
//! `build` needs `clean` and `makedirs`; `clean` in turn needs `clean_html`
//! and `clean_tgz`. `deploy` and `package` both need `build`.

use crate::demos::self_command;
use crate::error::RegistryResult;
use crate::registry::{Namespace, TaskBuilder, TaskDefinition};
use crate::runner::RunOptions;

/// A task that only prints a message
fn announce(name: &str, message: &'static str) -> TaskBuilder {
    TaskDefinition::builder(name).body(move |_, _| {
        println!("{}", message);
        Ok(None)
    })
}

pub fn namespace() -> RegistryResult<Namespace> {
    let demo = TaskDefinition::builder("demo")
        .doc("Example showing task deduplication.")
        .body(|ctx, _| {
            let options = RunOptions::default().echo(true);
            ctx.run_with(&self_command("dependencies.build dependencies.package")?, options)?;
            ctx.run_with(
                &self_command("--no-dedupe dependencies.build dependencies.package")?,
                options,
            )?;
            Ok(None)
        })
        .build();

    Namespace::from_tasks([
        announce("clean_html", "Cleaning HTML").doc("Remove generated HTML.").build(),
        announce("clean_tgz", "Cleaning .tar.gz files").doc("Remove built archives.").build(),
        announce("clean", "Cleaned everything")
            .doc("Remove every build artifact.")
            .pre("clean_html")
            .pre("clean_tgz")
            .build(),
        announce("makedirs", "Making directories").doc("Create output directories.").build(),
        announce("build", "Building")
            .doc("Build from a clean tree.")
            .pre("clean")
            .pre("makedirs")
            .build(),
        announce("deploy", "Deploying").doc("Deploy a fresh build.").pre("build").build(),
        announce("package", "Packaging").doc("Package a fresh build.").pre("build").build(),
        demo,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NameStyle, TaskRegistry};
    use crate::runner::DependencyResolver;

    fn plan(targets: &[&str], dedupe: bool) -> Vec<String> {
        let mut root = Namespace::new();
        root.add_namespace("dependencies", namespace().unwrap()).unwrap();
        let registry = TaskRegistry::from_namespace(root, NameStyle::default());
        let resolver = DependencyResolver::new(&registry);
        let invocations: Vec<_> = targets
            .iter()
            .map(|t| resolver.invocation(t, &[]).unwrap())
            .collect();
        resolver
            .plan_all(&invocations, dedupe)
            .unwrap()
            .names()
            .into_iter()
            .map(|n| n.trim_start_matches("dependencies.").to_string())
            .collect()
    }

    #[test]
    fn test_build_and_package_deduped() {
        assert_eq!(
            plan(&["dependencies.build", "dependencies.package"], true),
            vec!["clean-html", "clean-tgz", "clean", "makedirs", "build", "package"]
        );
    }

    #[test]
    fn test_build_and_package_without_dedupe() {
        assert_eq!(
            plan(&["dependencies.build", "dependencies.package"], false),
            vec![
                "clean-html",
                "clean-tgz",
                "clean",
                "makedirs",
                "build",
                "clean-html",
                "clean-tgz",
                "clean",
                "makedirs",
                "build",
                "package",
            ]
        );
    }
}
