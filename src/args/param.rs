//! Parameter declarations

use crate::args::{ParamKind, Value};
use crate::registry::naming::canonical;

/// A declared task parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Canonical (underscore) name
    pub name: String,

    /// Value used when no flag is given; `None` only for positional parameters
    pub default: Option<Value>,

    /// Inferred from the default, or set by the incrementable/iterable constructors
    pub kind: ParamKind,

    pub help: Option<String>,

    /// Explicit shorthand letter; otherwise one is picked automatically
    pub short: Option<char>,

    /// Filled from bare words in declaration order
    pub positional: bool,
}

impl ParamSpec {
    /// A flag whose type is inferred from `default`
    pub fn new(name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        ParamSpec {
            name: canonical(name),
            kind: default.kind(),
            default: Some(default),
            help: None,
            short: None,
            positional: false,
        }
    }

    /// A flag that collects repeated occurrences into a list
    pub fn iterable(name: &str) -> Self {
        ParamSpec {
            name: canonical(name),
            default: Some(Value::List(Vec::new())),
            kind: ParamKind::List,
            help: None,
            short: None,
            positional: false,
        }
    }

    /// A counter flag: each occurrence adds one to the default of zero
    pub fn incrementable(name: &str) -> Self {
        ParamSpec {
            name: canonical(name),
            default: Some(Value::Int(0)),
            kind: ParamKind::Counter,
            help: None,
            short: None,
            positional: false,
        }
    }

    /// A required string given as a bare word (or as a flag)
    pub fn positional(name: &str) -> Self {
        ParamSpec {
            name: canonical(name),
            default: None,
            kind: ParamKind::String,
            help: None,
            short: None,
            positional: true,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Boolean flags defaulting to true also get a `--no-` form
    pub fn has_negation(&self) -> bool {
        self.kind == ParamKind::Boolean && self.default == Some(Value::Bool(true))
    }
}
