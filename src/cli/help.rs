//! Task listing and per-task help text

use crate::args::{FlagTable, ParamKind, ParamSpec};
use crate::registry::{NameStyle, ResolvedTask, TaskRegistry};
use colored::Colorize;
use std::fmt::Write;

/// The `--list` output
pub fn render_task_list(registry: &TaskRegistry) -> String {
    let listings = registry.list();
    let mut out = String::new();

    if listings.is_empty() {
        out.push_str("No tasks found.\n");
        return out;
    }

    let width = listings.iter().map(|l| l.name.len()).max().unwrap_or(0);
    out.push_str("Subcommands:\n\n");
    for listing in &listings {
        let name = format!("{:<width$}", listing.name, width = width);
        let mut line = format!("  {}", name.cyan());
        if let Some(summary) = &listing.summary {
            let _ = write!(line, "   {}", summary);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let defaults: Vec<String> = listings
        .iter()
        .filter_map(|l| match l.default_for.as_deref() {
            Some("") => Some(l.name.clone()),
            Some(ns) => Some(format!("{} ({})", l.name, ns)),
            None => None,
        })
        .collect();
    if !defaults.is_empty() {
        let _ = write!(out, "\nDefault task: {}\n", defaults.join(", "));
    }

    out
}

/// The `<task> --help` output
pub fn render_task_help(program: &str, registry: &TaskRegistry, task: &ResolvedTask) -> String {
    let style = registry.style();
    let name = task.display_name(style);
    let params = &task.task.params;
    let mut out = String::new();

    let positionals: String = params
        .iter()
        .filter(|p| p.positional)
        .map(|p| format!(" <{}>", style.external(&p.name)))
        .collect();
    let options = if params.iter().any(|p| !p.positional) {
        " [--options]"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "{} {} [--core-opts] {}{}{} [other tasks here ...]",
        "Usage:".bold(),
        program,
        name,
        options,
        positionals
    );

    out.push('\n');
    out.push_str(&"Docstring:".bold().to_string());
    out.push('\n');
    match task.task.doc.as_deref().map(str::trim) {
        Some(doc) if !doc.is_empty() => {
            for line in doc.lines() {
                let _ = writeln!(out, "  {}", line.trim());
            }
        }
        _ => out.push_str("  none\n"),
    }

    out.push('\n');
    out.push_str(&"Options:".bold().to_string());
    out.push('\n');
    if params.is_empty() {
        out.push_str("  none\n");
        return out;
    }

    let table = FlagTable::new(params);
    let rows: Vec<(String, Option<&str>)> = params
        .iter()
        .enumerate()
        .map(|(i, p)| (flag_column(style, p, table.short_for(i)), p.help.as_deref()))
        .collect();
    let width = rows.iter().map(|(flags, _)| flags.len()).max().unwrap_or(0);
    for (flags, help) in rows {
        let line = format!("  {:<width$}   {}", flags, help.unwrap_or(""), width = width);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// `-n INT, --num=INT` style flag spelling
fn flag_column(style: &NameStyle, param: &ParamSpec, short: Option<char>) -> String {
    let long = if param.has_negation() {
        format!("--[no-]{}", style.external(&param.name))
    } else {
        style.long_flag(&param.name)
    };
    let placeholder = param.kind.takes_value().then(|| match param.kind {
        ParamKind::Integer => "INT",
        ParamKind::Float => "FLOAT",
        _ => "STRING",
    });

    match (short, placeholder) {
        (Some(s), Some(ph)) => format!("-{} {}, {}={}", s, ph, long, ph),
        (Some(s), None) => format!("-{}, {}", s, long),
        (None, Some(ph)) => format!("{}={}", long, ph),
        (None, None) => long,
    }
}
