//! Binding command-line tokens to task parameters
//!
//! Supported forms: `--name value`, `--name=value`, `-n value`, `-n=value`,
//! `-nvalue`, stacked switches (`-vvv`, `-vn100`), `--no-flag` for booleans
//! that default to true, and bare words for positional parameters.

use crate::args::{ParamKind, ParamSpec, Value};
use crate::error::{BindError, BindResult};
use crate::registry::naming::{canonical, NameStyle};
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// Shorthand letter reserved for `-h`
const HELP_SHORT: char = 'h';

/// Parameter values bound for one task invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&canonical(name))
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(canonical(name), value.into());
    }

    pub fn str(&self, name: &str) -> BindResult<&str> {
        self.typed(name, "string", Value::as_str)
    }

    pub fn int(&self, name: &str) -> BindResult<i64> {
        self.typed(name, "integer", Value::as_int)
    }

    pub fn float(&self, name: &str) -> BindResult<f64> {
        self.typed(name, "float", Value::as_float)
    }

    pub fn bool(&self, name: &str) -> BindResult<bool> {
        self.typed(name, "boolean", Value::as_bool)
    }

    pub fn list(&self, name: &str) -> BindResult<&[String]> {
        self.typed(name, "list of strings", Value::as_list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> BindResult<T> {
        let value = self
            .get(name)
            .ok_or_else(|| BindError::MissingArgument(name.to_string()))?;
        extract(value).ok_or_else(|| BindError::TypeMismatch {
            param: name.to_string(),
            value: value.to_string(),
            expected,
        })
    }
}

/// Outcome of binding the leading tokens that belong to one task
#[derive(Debug, Clone)]
pub struct BoundPrefix {
    pub args: Args,
    /// Number of tokens consumed, including a trailing `--`
    pub consumed: usize,
    /// `-h`/`--help` was given
    pub help: bool,
}

/// Flag names resolved for one parameter list
#[derive(Debug)]
pub struct FlagTable<'a> {
    params: &'a [ParamSpec],
    shorts: Vec<Option<char>>,
}

impl<'a> FlagTable<'a> {
    /// Explicit shorthands win; the rest take their first letter if still free
    pub fn new(params: &'a [ParamSpec]) -> Self {
        let mut taken = HashSet::from([HELP_SHORT]);
        let mut shorts: Vec<Option<char>> = params.iter().map(|p| p.short).collect();
        taken.extend(shorts.iter().flatten().copied());

        for (slot, param) in shorts.iter_mut().zip(params) {
            if slot.is_some() {
                continue;
            }
            if let Some(letter) = param.name.chars().next().filter(char::is_ascii_alphanumeric) {
                if taken.insert(letter) {
                    *slot = Some(letter);
                }
            }
        }

        FlagTable { params, shorts }
    }

    pub fn short_for(&self, index: usize) -> Option<char> {
        self.shorts.get(index).copied().flatten()
    }

    fn by_short(&self, letter: char) -> Option<usize> {
        self.shorts.iter().position(|s| *s == Some(letter))
    }

    /// Index of the parameter a long flag names, and whether it is the `--no-` form
    fn by_long(&self, name: &str) -> Option<(usize, bool)> {
        let key = canonical(name);
        if let Some(index) = self.params.iter().position(|p| p.name == key) {
            return Some((index, false));
        }
        let negated = key.strip_prefix("no_")?;
        self.params
            .iter()
            .position(|p| p.name == negated && p.has_negation())
            .map(|index| (index, true))
    }
}

/// Values collected so far for one invocation
struct Binding<'a> {
    params: &'a [ParamSpec],
    values: Vec<Option<Value>>,
}

impl<'a> Binding<'a> {
    fn new(params: &'a [ParamSpec]) -> Self {
        Binding {
            params,
            values: vec![None; params.len()],
        }
    }

    fn kind(&self, index: usize) -> ParamKind {
        self.params[index].kind
    }

    fn set(&mut self, index: usize, value: Value) {
        self.values[index] = Some(value);
    }

    /// Parse `raw` into the parameter's type; lists accumulate
    fn set_raw(&mut self, index: usize, raw: &str) -> BindResult<()> {
        let params = self.params;
        let param = &params[index];

        if param.kind == ParamKind::List {
            match &mut self.values[index] {
                Some(Value::List(items)) => items.push(raw.to_string()),
                slot => *slot = Some(Value::List(vec![raw.to_string()])),
            }
            return Ok(());
        }

        self.values[index] = Some(param.kind.parse(&param.name, raw)?);
        Ok(())
    }

    fn increment(&mut self, index: usize) -> BindResult<()> {
        let current = self.values[index]
            .as_ref()
            .or(self.params[index].default.as_ref())
            .and_then(Value::as_int)
            .unwrap_or(0);
        let next = current.checked_add(1).ok_or_else(|| BindError::TypeMismatch {
            param: self.params[index].name.clone(),
            value: current.to_string(),
            expected: "count",
        })?;
        self.values[index] = Some(Value::Int(next));
        Ok(())
    }

    /// Give a bare word to the next unfilled positional parameter
    fn fill_positional(&mut self, raw: &str) -> BindResult<bool> {
        let next = self
            .params
            .iter()
            .enumerate()
            .position(|(i, p)| p.positional && self.values[i].is_none());
        match next {
            Some(index) => {
                self.set_raw(index, raw)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn check_required(&self) -> BindResult<()> {
        for (param, value) in self.params.iter().zip(&self.values) {
            if value.is_none() && param.default.is_none() {
                return Err(BindError::MissingArgument(param.name.clone()));
            }
        }
        Ok(())
    }

    fn finish(self) -> Args {
        let mut args = Args::new();
        for (param, value) in self.params.iter().zip(self.values) {
            if let Some(value) = value.or_else(|| param.default.clone()) {
                args.values.insert(param.name.clone(), value);
            }
        }
        args
    }
}

/// Maps raw command-line tokens onto a task's declared parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentBinder {
    style: NameStyle,
}

impl ArgumentBinder {
    pub fn new(style: NameStyle) -> Self {
        ArgumentBinder { style }
    }

    pub fn style(&self) -> &NameStyle {
        &self.style
    }

    /// Bind every token; leftover bare words are an error
    pub fn bind(&self, params: &[ParamSpec], raw: &[String]) -> BindResult<Args> {
        let bound = self.bind_prefix(params, raw)?;
        if let Some(extra) = raw.get(bound.consumed) {
            return Err(BindError::UnexpectedArgument(extra.clone()));
        }
        Ok(bound.args)
    }

    /// Bind the leading tokens that belong to this task
    ///
    /// Stops at `--` (consumed) or at the first bare word no positional
    /// parameter wants; that word starts the next task.
    pub fn bind_prefix(&self, params: &[ParamSpec], raw: &[String]) -> BindResult<BoundPrefix> {
        let table = FlagTable::new(params);
        let mut binding = Binding::new(params);
        let mut help = false;
        let mut i = 0;

        while i < raw.len() {
            let token = raw[i].as_str();

            if token == "--" {
                i += 1;
                break;
            }

            if let Some(long) = token.strip_prefix("--") {
                let (name, inline) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (long, None),
                };
                match table.by_long(name) {
                    Some((index, negated)) => {
                        i = apply_long(&mut binding, index, negated, inline, token, raw, i)?;
                    }
                    None if name == "help" && inline.is_none() => {
                        help = true;
                        i += 1;
                    }
                    None => return Err(BindError::UnknownOption(token.to_string())),
                }
                continue;
            }

            if token.len() > 1 && token.starts_with('-') {
                i = apply_short_cluster(&table, &mut binding, &mut help, raw, i)?;
                continue;
            }

            if binding.fill_positional(token)? {
                i += 1;
            } else {
                break;
            }
        }

        if !help {
            binding.check_required()?;
        }

        trace!(consumed = i, help, "bound task arguments");
        Ok(BoundPrefix {
            args: binding.finish(),
            consumed: i,
            help,
        })
    }
}

/// A following token usable as a flag value; a lone `-` counts as one
fn next_value(raw: &[String], index: usize) -> Option<&str> {
    raw.get(index)
        .map(String::as_str)
        .filter(|v| *v == "-" || !v.starts_with('-') || v.parse::<f64>().is_ok())
}

fn apply_long(
    binding: &mut Binding<'_>,
    index: usize,
    negated: bool,
    inline: Option<&str>,
    token: &str,
    raw: &[String],
    i: usize,
) -> BindResult<usize> {
    match binding.kind(index) {
        ParamKind::Boolean => {
            let value = match inline {
                None => true,
                Some(text) => {
                    let name = &binding.params[index].name;
                    ParamKind::Boolean
                        .parse(name, text)?
                        .as_bool()
                        .unwrap_or(true)
                }
            };
            binding.set(index, Value::Bool(value != negated));
            Ok(i + 1)
        }
        ParamKind::Counter => {
            match inline {
                None => binding.increment(index)?,
                Some(text) => binding.set_raw(index, text)?,
            }
            Ok(i + 1)
        }
        _ => match inline {
            Some(text) => {
                binding.set_raw(index, text)?;
                Ok(i + 1)
            }
            None => {
                let value = next_value(raw, i + 1)
                    .ok_or_else(|| BindError::MissingValue(token.to_string()))?;
                binding.set_raw(index, value)?;
                Ok(i + 2)
            }
        },
    }
}

fn apply_short_cluster(
    table: &FlagTable<'_>,
    binding: &mut Binding<'_>,
    help: &mut bool,
    raw: &[String],
    i: usize,
) -> BindResult<usize> {
    let letters: Vec<char> = raw[i].chars().skip(1).collect();

    for (j, &letter) in letters.iter().enumerate() {
        let Some(index) = table.by_short(letter) else {
            if letter == HELP_SHORT {
                *help = true;
                continue;
            }
            return Err(BindError::UnknownOption(format!("-{}", letter)));
        };

        match binding.kind(index) {
            ParamKind::Counter => binding.increment(index)?,
            ParamKind::Boolean => binding.set(index, Value::Bool(true)),
            _ => {
                // the rest of the cluster is the value: -n100, -n=100
                let rest: String = letters[j + 1..].iter().collect();
                let attached = rest.strip_prefix('=').unwrap_or(rest.as_str());
                if !attached.is_empty() {
                    binding.set_raw(index, attached)?;
                    return Ok(i + 1);
                }
                let value = next_value(raw, i + 1)
                    .ok_or_else(|| BindError::MissingValue(format!("-{}", letter)))?;
                binding.set_raw(index, value)?;
                return Ok(i + 2);
            }
        }
    }

    Ok(i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn params_task() -> Vec<ParamSpec> {
        vec![
            ParamSpec::iterable("a_list"),
            ParamSpec::incrementable("verbose"),
            ParamSpec::new("num", 42).help("A param typed as a number"),
            ParamSpec::new("string", "Hi there!"),
            ParamSpec::new("is_debug", true),
            ParamSpec::new("is_admin", false),
        ]
    }

    fn bind(raw: &[&str]) -> BindResult<Args> {
        ArgumentBinder::default().bind(&params_task(), &tokens(raw))
    }

    #[test]
    fn test_defaults_when_no_flags() {
        let args = bind(&[]).unwrap();
        assert_eq!(args.list("a_list").unwrap(), &[] as &[String]);
        assert_eq!(args.int("verbose").unwrap(), 0);
        assert_eq!(args.int("num").unwrap(), 42);
        assert_eq!(args.str("string").unwrap(), "Hi there!");
        assert!(args.bool("is_debug").unwrap());
        assert!(!args.bool("is_admin").unwrap());
    }

    #[test]
    fn test_negated_boolean() {
        let args = bind(&["--no-is-debug"]).unwrap();
        assert!(!args.bool("is_debug").unwrap());

        let args = bind(&["--is-debug"]).unwrap();
        assert!(args.bool("is_debug").unwrap());
    }

    #[test]
    fn test_false_default_has_no_negation() {
        assert!(bind(&["--is-admin"]).unwrap().bool("is_admin").unwrap());
        let err = bind(&["--no-is-admin"]).unwrap_err();
        assert!(matches!(err, BindError::UnknownOption(ref flag) if flag == "--no-is-admin"));
    }

    #[test]
    fn test_stacked_counter() {
        assert_eq!(bind(&["-vvv"]).unwrap().int("verbose").unwrap(), 3);
        assert_eq!(bind(&["-vvvvvvv"]).unwrap().int("verbose").unwrap(), 7);
        assert_eq!(bind(&["-v", "--verbose"]).unwrap().int("verbose").unwrap(), 2);
    }

    #[test]
    fn test_mixed_short_cluster() {
        let args = bind(&["-vn100"]).unwrap();
        assert_eq!(args.int("verbose").unwrap(), 1);
        assert_eq!(args.int("num").unwrap(), 100);
    }

    #[test]
    fn test_counter_overflow_is_an_error() {
        let err = bind(&["--verbose=9223372036854775807", "-v"]).unwrap_err();
        match err {
            BindError::TypeMismatch { param, expected, .. } => {
                assert_eq!(param, "verbose");
                assert_eq!(expected, "count");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lone_dash_is_a_value() {
        let args = bind(&["--string", "-"]).unwrap();
        assert_eq!(args.str("string").unwrap(), "-");
        let args = bind(&["-s", "-"]).unwrap();
        assert_eq!(args.str("string").unwrap(), "-");
    }

    #[test]
    fn test_iterable_accumulates_in_order() {
        let args = bind(&["--a-list", "Foo", "--a-list", "bar"]).unwrap();
        assert_eq!(args.list("a_list").unwrap(), &["Foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn test_type_mismatch_names_param() {
        let err = bind(&["--num", "not-a-number"]).unwrap_err();
        match err {
            BindError::TypeMismatch { param, value, .. } => {
                assert_eq!(param, "num");
                assert_eq!(value, "not-a-number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_value_forms() {
        for form in [
            vec!["--num", "100"],
            vec!["--num=100"],
            vec!["-n", "100"],
            vec!["-n=100"],
            vec!["-n100"],
        ] {
            let args = bind(&form).unwrap();
            assert_eq!(args.int("num").unwrap(), 100, "form {form:?}");
        }
    }

    #[test]
    fn test_underscore_alias_accepted() {
        assert!(!bind(&["--no_is_debug"]).unwrap().bool("is_debug").unwrap());
        assert_eq!(bind(&["--a_list", "x"]).unwrap().list("a_list").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_options() {
        assert!(matches!(bind(&["--nameRob"]), Err(BindError::UnknownOption(_))));
        assert!(matches!(bind(&["-z"]), Err(BindError::UnknownOption(ref f)) if f == "-z"));
    }

    #[test]
    fn test_missing_value() {
        assert!(matches!(bind(&["--num"]), Err(BindError::MissingValue(ref f)) if f == "--num"));
        assert!(matches!(bind(&["--string", "--num", "1"]), Err(BindError::MissingValue(_))));
    }

    #[test]
    fn test_negative_number_value() {
        assert_eq!(bind(&["--num", "-5"]).unwrap().int("num").unwrap(), -5);
    }

    #[test]
    fn test_auto_short_flags_skip_taken_letters() {
        let params = params_task();
        let table = FlagTable::new(&params);
        assert_eq!(table.short_for(0), Some('a'));
        assert_eq!(table.short_for(1), Some('v'));
        assert_eq!(table.short_for(2), Some('n'));
        assert_eq!(table.short_for(3), Some('s'));
        assert_eq!(table.short_for(4), Some('i'));
        // 'i' already belongs to is_debug
        assert_eq!(table.short_for(5), None);
    }

    #[test]
    fn test_help_letter_is_reserved() {
        let params = vec![ParamSpec::new("host", "localhost")];
        let table = FlagTable::new(&params);
        assert_eq!(table.short_for(0), None);

        let bound = ArgumentBinder::default()
            .bind_prefix(&params, &tokens(&["-h"]))
            .unwrap();
        assert!(bound.help);
    }

    #[test]
    fn test_explicit_short() {
        let params = vec![ParamSpec::new("server_name", "devserver").short('x')];
        let args = ArgumentBinder::default()
            .bind(&params, &tokens(&["-x", "prod"]))
            .unwrap();
        assert_eq!(args.str("server-name").unwrap(), "prod");
    }

    #[test]
    fn test_prefix_stops_at_next_task() {
        let bound = ArgumentBinder::default()
            .bind_prefix(&params_task(), &tokens(&["-n", "1", "package", "--x"]))
            .unwrap();
        assert_eq!(bound.consumed, 2);
        assert_eq!(bound.args.int("num").unwrap(), 1);
    }

    #[test]
    fn test_double_dash_ends_task() {
        let bound = ArgumentBinder::default()
            .bind_prefix(&params_task(), &tokens(&["-v", "--", "next"]))
            .unwrap();
        assert_eq!(bound.consumed, 2);
    }

    #[test]
    fn test_positional() {
        let params = vec![ParamSpec::positional("target"), ParamSpec::new("force", false)];
        let binder = ArgumentBinder::default();

        let args = binder.bind(&params, &tokens(&["prod", "--force"])).unwrap();
        assert_eq!(args.str("target").unwrap(), "prod");
        assert!(args.bool("force").unwrap());

        let args = binder.bind(&params, &tokens(&["--target", "dev"])).unwrap();
        assert_eq!(args.str("target").unwrap(), "dev");

        let err = binder.bind(&params, &tokens(&["--force"])).unwrap_err();
        assert!(matches!(err, BindError::MissingArgument(ref n) if n == "target"));

        let err = binder.bind(&params, &tokens(&["a", "b"])).unwrap_err();
        assert!(matches!(err, BindError::UnexpectedArgument(ref a) if a == "b"));
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let args = bind(&[]).unwrap();
        assert!(matches!(args.int("string"), Err(BindError::TypeMismatch { .. })));
        assert!(matches!(args.str("missing"), Err(BindError::MissingArgument(_))));
    }
}
