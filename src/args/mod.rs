//! Task parameters
//!
//! This module declares task parameters, infers their types from defaults
//! and binds command-line flags to them.

pub mod binder;
pub mod param;
pub mod value;

pub use binder::*;
pub use param::*;
pub use value::*;
