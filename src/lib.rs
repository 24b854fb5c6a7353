//! rinvoke - a small task runner
//!
//! Tasks are Rust closures registered under names, grouped into namespaces
//! and wired together with pre/post dependencies. A [`cli::Program`] turns a
//! command line such as `rinvoke dependencies.build --no-dedupe` into an
//! execution plan and runs it against a shared [`runner::Context`].

// Public modules
pub mod args;
pub mod cli;
pub mod config;
pub mod demos;
pub mod error;
pub mod registry;
pub mod runner;
pub mod testing;

// Re-export commonly used types
pub use args::{Args, ParamSpec, Value};
pub use error::{Result, RinvokeError};
pub use registry::{Call, Namespace, TaskDefinition, TaskRegistry};
pub use runner::Context;

use tracing_subscriber::EnvFilter;

/// Current version of rinvoke
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter, e.g. `RINVOKE_LOG=rinvoke=debug`
pub const LOG_ENV: &str = "RINVOKE_LOG";

/// Install the stderr log subscriber; warnings only unless `RINVOKE_LOG` says otherwise
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
