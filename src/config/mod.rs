//! Configuration parsing and validation
//!
//! This module handles discovery and layering of rinvoke.yml configuration
//! files and validation of their contents.

pub mod interpolate;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
