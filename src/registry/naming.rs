//! Task and flag name normalization
//!
//! Tasks and parameters are declared with Rust-style `snake_case` identifiers,
//! while the command line conventionally uses `kebab-case`. Lookups accept both.

/// Separator between namespace segments in qualified task names
pub const PATH_SEPARATOR: char = '.';

/// How names are displayed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameStyle {
    /// Convert underscores to hyphens for display
    pub auto_dash: bool,
}

impl NameStyle {
    pub fn new(auto_dash: bool) -> Self {
        NameStyle { auto_dash }
    }

    /// The name as shown in listings, help and flags
    pub fn external(&self, name: &str) -> String {
        if self.auto_dash {
            name.replace('_', "-")
        } else {
            name.to_string()
        }
    }

    /// The `--flag` spelling of a parameter name
    pub fn long_flag(&self, name: &str) -> String {
        format!("--{}", self.external(name))
    }

    /// The `--no-flag` spelling of a boolean parameter name
    pub fn negated_flag(&self, name: &str) -> String {
        if self.auto_dash {
            format!("--no-{}", self.external(name))
        } else {
            format!("--no_{}", name)
        }
    }
}

impl Default for NameStyle {
    fn default() -> Self {
        NameStyle { auto_dash: true }
    }
}

/// Lookup key for a name: both `hello_world` and `hello-world` map to `hello_world`
pub fn canonical(name: &str) -> String {
    name.trim().replace('-', "_")
}

/// Split a qualified name into canonical segments
pub fn split_path(name: &str) -> Vec<String> {
    name.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(canonical)
        .collect()
}

/// Join segments into a qualified display name
pub fn join_path(style: &NameStyle, segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| style.external(s))
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}
