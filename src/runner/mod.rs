//! Task execution engine
//!
//! This module expands requested tasks into an execution plan and runs it
//! against a shared context that carries the command runner.

pub mod command;
pub mod context;
pub mod executor;
pub mod plan;
pub mod scoped;

// Re-export main types
pub use command::*;
pub use context::*;
pub use executor::*;
pub use plan::*;
pub use scoped::*;
