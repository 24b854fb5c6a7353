//! Variable interpolation for strings
//!
//! Replaces `${var}` references. Substituted text is not scanned again, so
//! a value containing `${...}` is taken literally.

use crate::error::{InterpolationError, InterpolationResult};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid interpolation pattern"))
}

/// Interpolate `${var}` references using `lookup`; undefined names are an error
pub fn interpolate<F>(s: &str, lookup: F) -> InterpolationResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let result = pattern().replace_all(s, |caps: &Captures| {
        let name = caps[1].trim();
        match lookup(name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(InterpolationError::UndefinedVariable(name)),
        None => Ok(result.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_interpolation() {
        let vars = vars(&[("name", "world")]);
        let result = interpolate("Hello, ${name}!", |k| vars.get(k).cloned()).unwrap();
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_multiple_references() {
        let vars = vars(&[("a", "1"), ("b", "2")]);
        let result = interpolate("${a}-${b}-${a}", |k| vars.get(k).cloned()).unwrap();
        assert_eq!(result, "1-2-1");
    }

    #[test]
    fn test_no_rescan_of_values() {
        let vars = vars(&[("a", "${b}"), ("b", "x")]);
        let result = interpolate("${a}", |k| vars.get(k).cloned()).unwrap();
        assert_eq!(result, "${b}");
    }

    #[test]
    fn test_undefined_variable() {
        let err = interpolate("${nope}", |_| None).unwrap_err();
        assert!(matches!(err, InterpolationError::UndefinedVariable(ref n) if n == "nope"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(interpolate("no vars $HOME", |_| None).unwrap(), "no vars $HOME");
    }
}
