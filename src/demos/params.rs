//! Tasks showing the context and every kind of task parameter

use crate::args::{ParamSpec, Value};
use crate::demos::self_command;
use crate::error::RegistryResult;
use crate::registry::{Namespace, TaskDefinition};
use crate::runner::RunOptions;

/// Every parameter of `params`, in declaration order
const PARAM_NAMES: &[&str] = &["a_list", "verbose", "num", "string", "is_debug", "is_admin"];

/// Ways of passing `--name`, including two that are rejected
const GREET_FLAG_FORMS: &[&str] =
    &["--name Rob", "--name=Rob", "-n Rob", "-n=Rob", "-nRob", "Rob", "--nameRob"];

pub fn namespace() -> RegistryResult<Namespace> {
    let cat_latest = TaskDefinition::builder("cat_c01_latest")
        .doc("Use the context to show the contents of the most recently changed file in a directory.")
        .param(ParamSpec::new("path", "../c01").help("directory to look in"))
        .body(|ctx, args| {
            let ctx = ctx.cd(args.str("path")?);
            ctx.run("ls -rt")?;
            ctx.run(r#"cat "$(ls -rt | tail -n1)""#)?;
            Ok(None)
        })
        .build();

    let greet = TaskDefinition::builder("greet")
        .doc("First use of parameters.")
        .param(ParamSpec::new("name", "human").help("The name to greet"))
        .body(|_, args| {
            println!("Pleasure to meet you, {}.", args.str("name")?);
            Ok(None)
        })
        .build();

    let showoff_greet = TaskDefinition::builder("showoff_greet")
        .doc("Show all the different ways that you can set an option.")
        .body(|ctx, _| {
            let options = RunOptions::default().echo(true).warn(true);
            for flags in GREET_FLAG_FORMS {
                let command = self_command(&format!("params.greet {}", flags))?;
                let out = ctx.run_with(&command, options)?;
                if !out.success() {
                    println!("That didn't work!");
                }
            }
            Ok(None)
        })
        .build();

    let params = TaskDefinition::builder("params")
        .doc("A task that shows off how parameter types are inferred from defaults.")
        .param(ParamSpec::iterable("a_list"))
        .param(ParamSpec::incrementable("verbose"))
        .param(ParamSpec::new("num", 42).help("A param typed as a number"))
        .param(ParamSpec::new("string", "Hi there!").help("A param typed as a string"))
        .param(ParamSpec::new("is_debug", true))
        .param(ParamSpec::new("is_admin", false))
        .body(|_, args| {
            for name in PARAM_NAMES {
                if let Some(value) = args.get(name) {
                    println!("{}", describe(name, value));
                }
            }
            Ok(None)
        })
        .build();

    let showoff_params = TaskDefinition::builder("showoff_params")
        .doc("Show all the different option types.")
        .body(|ctx, _| {
            let options = RunOptions::default().echo(true).warn(true);
            for flags in [
                "--a-list Foo --a-list bar",
                "-vvvvvvv",
                "-n100",
                "--num 'a string?'",
                "--is-debug",
                "--no-is-debug",
                "--is-admin",
                "--no-is-admin",
            ] {
                let out = ctx.run_with(&self_command(&format!("params.params {}", flags))?, options)?;
                if !out.success() {
                    println!("That didn't work!");
                }
            }
            Ok(None)
        })
        .build();

    Namespace::from_tasks([cat_latest, greet, showoff_greet, params, showoff_params])
}

/// One line of `params` output
fn describe(name: &str, value: &Value) -> String {
    format!(
        "The value of '{}' is {}. The type is {}",
        name,
        value,
        value.kind().type_name()
    )
}
