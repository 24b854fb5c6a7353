//! The smallest possible task

use crate::error::RegistryResult;
use crate::registry::{Namespace, TaskDefinition};

pub fn namespace() -> RegistryResult<Namespace> {
    Namespace::from_tasks([TaskDefinition::builder("hello_world")
        .doc("The obligatory first example.")
        .body(|_, _| {
            println!("Hello world!");
            Ok(None)
        })
        .build()])
}
