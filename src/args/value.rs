//! Parameter values and their inferred kinds

use crate::error::{BindError, BindResult};
use std::fmt;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

/// The semantic type of a parameter, inferred from its default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Repeated occurrences accumulate into a list
    List,
    /// Each occurrence adds one; no value is taken
    Counter,
}

impl ParamKind {
    /// Whether a flag of this kind consumes a value
    pub fn takes_value(self) -> bool {
        !matches!(self, ParamKind::Boolean | ParamKind::Counter)
    }

    /// Human-readable type name used in help and errors
    pub fn type_name(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Float => "float",
            ParamKind::Boolean => "boolean",
            ParamKind::List => "list of strings",
            ParamKind::Counter => "count",
        }
    }

    /// Parse a raw command-line value into this kind
    pub fn parse(self, param: &str, raw: &str) -> BindResult<Value> {
        let mismatch = || BindError::TypeMismatch {
            param: param.to_string(),
            value: raw.to_string(),
            expected: self.type_name(),
        };

        match self {
            ParamKind::String => Ok(Value::Str(raw.to_string())),
            ParamKind::Integer | ParamKind::Counter => {
                raw.trim().parse::<i64>().map(Value::Int).map_err(|_| mismatch())
            }
            ParamKind::Float => raw.trim().parse::<f64>().map(Value::Float).map_err(|_| mismatch()),
            ParamKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            ParamKind::List => Ok(Value::List(vec![raw.to_string()])),
        }
    }
}

impl Value {
    /// The kind a parameter defaulting to this value takes
    pub fn kind(&self) -> ParamKind {
        match self {
            Value::Str(_) => ParamKind::String,
            Value::Int(_) => ParamKind::Integer,
            Value::Float(_) => ParamKind::Float,
            Value::Bool(_) => ParamKind::Boolean,
            Value::List(_) => ParamKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}
