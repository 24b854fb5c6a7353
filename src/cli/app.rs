//! Main CLI application
//!
//! A [`Program`] owns a root namespace and turns an argument list into an
//! execution plan: program flags are parsed by clap, everything from the
//! first task name on is split into per-task token runs.

use crate::args::ArgumentBinder;
use crate::cli::help::{render_task_help, render_task_list};
use crate::config::{load_config, Config};
use crate::error::{ExecutionError, Result, RinvokeError};
use crate::registry::{NameStyle, Namespace, ResolvedTask, TaskRegistry};
use crate::runner::{Context, DependencyResolver, Executor, FailurePolicy, Invocation, Verbosity};
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::debug;

/// A task-running command line program
#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    version: String,
    about: String,
    namespace: Namespace,
}

/// What the task tokens asked for
enum Request {
    Run(Vec<Invocation>),
    Help(ResolvedTask),
}

impl Program {
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        Program {
            name: name.into(),
            version: crate::VERSION.to_string(),
            about: "Run tasks and their dependencies".to_string(),
            namespace,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run with the process arguments
    pub fn run(&self) -> Result<()> {
        self.run_from(std::env::args_os())
    }

    /// Run with explicit arguments; the first is the program name
    pub fn run_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.print()?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(shell) = matches.get_one::<Shell>("print-completion-script") {
            generate(*shell, &mut self.command(), self.name.clone(), &mut io::stdout());
            return Ok(());
        }

        let mut config = load_config(matches.get_one::<PathBuf>("file").map(PathBuf::as_path))?;
        apply_overrides(&mut config, &matches);
        debug!(source = ?config.source, "configuration loaded");
        let display_name = config.name.clone().unwrap_or_else(|| self.name.clone());

        let registry = TaskRegistry::from_namespace(
            self.namespace.clone(),
            NameStyle::new(config.tasks.auto_dash_names),
        );

        if matches.get_flag("list") {
            print!("{}", render_task_list(&registry));
            return Ok(());
        }

        let tokens: Vec<String> = matches
            .get_many::<String>("tasks")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let resolver = DependencyResolver::new(&registry);
        let invocations = if tokens.is_empty() {
            match registry.default_task() {
                Some(task) => {
                    let name = task.display_name(registry.style());
                    vec![resolver.invocation(&name, &[])?]
                }
                None => {
                    self.command_as(&display_name).print_help()?;
                    println!();
                    return Ok(());
                }
            }
        } else {
            match split_invocations(&registry, &tokens)? {
                Request::Run(invocations) => invocations,
                Request::Help(task) => {
                    print!("{}", render_task_help(&display_name, &registry, &task));
                    return Ok(());
                }
            }
        };

        let plan = resolver.plan_all(&invocations, config.tasks.dedupe)?;
        debug!(steps = ?plan.names(), "execution plan");

        let mut ctx = Context::from_config(&config)?.with_verbosity(get_verbosity(&matches));
        let policy = if config.tasks.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::KeepGoing
        };
        Executor::new(policy).run(&plan, &mut ctx)?.into_result()?;
        Ok(())
    }

    /// Build the clap command for program-level flags
    fn command(&self) -> Command {
        self.command_as(&self.name)
    }

    /// The clap command, shown under `name` in usage text
    fn command_as(&self, name: &str) -> Command {
        Command::new(name.to_string())
            .version(self.version.clone())
            .about(self.about.clone())
            .override_usage(format!(
                "{} [--core-opts] <task> [--task-opts] ... <task> [--task-opts]",
                name
            ))
            .arg(
                Arg::new("file")
                    .short('f')
                    .long("file")
                    .value_name("FILE")
                    .value_parser(value_parser!(PathBuf))
                    .help("Path to a rinvoke.yml config file"),
            )
            .arg(
                Arg::new("list")
                    .short('l')
                    .long("list")
                    .help("List available tasks")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-dedupe")
                    .long("no-dedupe")
                    .help("Run tasks every time they are reached")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("keep-going")
                    .long("keep-going")
                    .help("Continue after a task fails")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("echo")
                    .short('e')
                    .long("echo")
                    .help("Echo commands before running them")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .help("Only print command output and errors")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Print verbose output")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("quiet"),
            )
            .arg(
                Arg::new("print-completion-script")
                    .long("print-completion-script")
                    .value_name("SHELL")
                    .value_parser(value_parser!(Shell))
                    .help("Print a shell completion script"),
            )
            .arg(
                Arg::new("tasks")
                    .value_name("TASKS")
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .help("Tasks to run, each followed by its own flags"),
            )
    }
}

/// Command line flags take precedence over the configuration files
fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if matches.get_flag("no-dedupe") {
        config.tasks.dedupe = false;
    }
    if matches.get_flag("keep-going") {
        config.tasks.fail_fast = false;
    }
    if matches.get_flag("echo") {
        config.run.echo = true;
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Split `task1 --x 1 task2 -y` into one invocation per task
fn split_invocations(registry: &TaskRegistry, tokens: &[String]) -> Result<Request> {
    let binder = ArgumentBinder::new(*registry.style());
    let mut invocations = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let resolved = registry.resolve(&tokens[i])?;
        let bound = binder.bind_prefix(&resolved.task.params, &tokens[i + 1..])?;
        if bound.help {
            return Ok(Request::Help(resolved));
        }

        i += 1 + bound.consumed;
        invocations.push(Invocation {
            name: resolved.display_name(registry.style()),
            path: resolved.path,
            task: resolved.task,
            args: bound.args,
        });
    }

    Ok(Request::Run(invocations))
}

/// Process exit status for an error
///
/// A failed shell command passes its own exit code through.
pub fn exit_code(err: &RinvokeError) -> i32 {
    let command_code = match err {
        RinvokeError::Execution(ExecutionError::CommandFailed { code, .. }) => *code,
        RinvokeError::Execution(ExecutionError::Task { source, .. }) => {
            match source.downcast_ref::<ExecutionError>() {
                Some(ExecutionError::CommandFailed { code, .. }) => *code,
                _ => None,
            }
        }
        _ => None,
    };
    command_code.filter(|code| *code != 0).unwrap_or(1)
}

/// Print an error and exit
pub fn exit_with(err: RinvokeError) -> ! {
    match err {
        RinvokeError::Cli(e) => e.exit(),
        other => {
            eprintln!("{} {}", "Error:".red().bold(), other);
            process::exit(exit_code(&other));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ParamSpec;
    use crate::error::{BindError, RegistryError};
    use crate::registry::TaskDefinition;

    fn registry() -> TaskRegistry {
        let mut registry = TaskRegistry::new(NameStyle::default());
        registry
            .register(
                TaskDefinition::builder("greet")
                    .param(ParamSpec::new("name", "human"))
                    .build(),
            )
            .unwrap();
        registry
            .register(
                TaskDefinition::builder("params")
                    .param(ParamSpec::incrementable("verbose"))
                    .build(),
            )
            .unwrap();
        registry
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn names(request: Request) -> Vec<String> {
        match request {
            Request::Run(invocations) => invocations.into_iter().map(|i| i.name).collect(),
            Request::Help(_) => panic!("expected a run request"),
        }
    }

    #[test]
    fn test_split_multiple_tasks() {
        let registry = registry();
        let request =
            split_invocations(&registry, &tokens(&["greet", "-n", "Rob", "params", "-vv"])).unwrap();
        assert_eq!(names(request), vec!["greet", "params"]);
    }

    #[test]
    fn test_split_double_dash() {
        let registry = registry();
        let request = split_invocations(&registry, &tokens(&["params", "--", "greet"])).unwrap();
        assert_eq!(names(request), vec!["params", "greet"]);
    }

    #[test]
    fn test_split_help_request() {
        let registry = registry();
        let request = split_invocations(&registry, &tokens(&["greet", "--help"])).unwrap();
        assert!(matches!(request, Request::Help(ref t) if t.path == vec!["greet"]));
    }

    #[test]
    fn test_split_errors() {
        let registry = registry();
        assert!(matches!(
            split_invocations(&registry, &tokens(&["greet", "Rob"])),
            Err(RinvokeError::Registry(RegistryError::UnknownTask(_)))
        ));
        assert!(matches!(
            split_invocations(&registry, &tokens(&["greet", "--nameRob"])),
            Err(RinvokeError::Bind(BindError::UnknownOption(_)))
        ));
    }

    #[test]
    fn test_program_defaults_to_crate_version() {
        let program = Program::new("test", Namespace::new());
        assert_eq!(program.version, crate::VERSION);
        assert_eq!(program.version("50.0.0").version, "50.0.0");
    }

    #[test]
    fn test_usage_shows_given_name() {
        let program = Program::new("rinvoke", Namespace::new());
        let usage = program.command_as("mytool").render_usage().to_string();
        assert!(usage.contains("mytool [--core-opts]"));
    }

    #[test]
    fn test_get_verbosity() {
        let program = Program::new("test", Namespace::new());
        let matches = program.command().get_matches_from(vec!["test", "-v"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Verbose);
        let matches = program.command().get_matches_from(vec!["test"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_task_flags_not_taken_by_program() {
        let program = Program::new("test", Namespace::new());
        let matches = program
            .command()
            .get_matches_from(vec!["test", "--no-dedupe", "params", "-v", "--list"]);
        assert!(matches.get_flag("no-dedupe"));
        assert!(!matches.get_flag("verbose"));
        assert!(!matches.get_flag("list"));
        let rest: Vec<&String> = matches.get_many::<String>("tasks").unwrap().collect();
        assert_eq!(rest, vec!["params", "-v", "--list"]);
    }

    #[test]
    fn test_exit_code_passes_command_status() {
        let err: RinvokeError = ExecutionError::Task {
            task: "build".to_string(),
            position: 1,
            total: 1,
            source: ExecutionError::CommandFailed {
                command: "exit 3".to_string(),
                code: Some(3),
            }
            .into(),
        }
        .into();
        assert_eq!(exit_code(&err), 3);

        let err: RinvokeError = BindError::UnknownOption("--x".to_string()).into();
        assert_eq!(exit_code(&err), 1);
    }
}
