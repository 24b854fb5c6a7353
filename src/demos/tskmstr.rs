//! Tasks of the `tskmstr` program, a custom CLI with its own name and version

use crate::args::ParamSpec;
use crate::cli::Program;
use crate::error::RegistryResult;
use crate::registry::{Namespace, TaskDefinition};

pub const VERSION: &str = "50.0.0";

pub fn namespace() -> RegistryResult<Namespace> {
    Namespace::from_tasks([
        TaskDefinition::builder("calculate_pi")
            .doc("Sample subcommand 1.")
            .param(ParamSpec::new("digits", 314))
            .body(|_, args| {
                println!("Calculating pi to {} digits!", args.int("digits")?);
                Ok(None)
            })
            .build(),
        TaskDefinition::builder("start_server")
            .doc("Sample subcommand 2.")
            .param(ParamSpec::new("server_name", "devserver"))
            .body(|_, args| {
                println!("Starting up {}.", args.str("server_name")?);
                Ok(None)
            })
            .build(),
    ])
}

pub fn program() -> RegistryResult<Program> {
    Ok(Program::new("tskmstr", namespace()?)
        .version(VERSION)
        .about("Task master: a custom program built from a task namespace"))
}
