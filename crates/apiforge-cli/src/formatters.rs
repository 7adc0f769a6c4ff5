//! Output formatters for command results.
//!
//! Every command builds a serializable result and hands it here, so the
//! three output modes behave the same everywhere.

use anyhow::Result;
use apiforge_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Formats `data` for the requested output mode.
///
/// # Errors
///
/// Returns an error if `data` cannot be serialized.
///
/// # Examples
///
/// ```
/// use apiforge_cli::formatters::format_output;
/// use apiforge_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     class_name: String,
///     methods: usize,
/// }
///
/// let summary = Summary { class_name: "PetClient".to_string(), methods: 3 };
/// let output = format_output(&summary, OutputFormat::Text)?;
/// assert_eq!(output, "class_name: PetClient\nmethods: 3");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let value = serde_json::to_value(data)?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value)?,
        OutputFormat::Text => text(&value),
        OutputFormat::Pretty => {
            let mut out = String::new();
            pretty(&value, 0, &mut out);
            out.trim_end().to_string()
        }
    })
}

/// `key: value` lines; nested values stay compact JSON so each line is
/// one field.
fn text(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", scalar(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join("\n"),
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Indented tree with colored keys and values.
fn pretty(value: &Value, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(inner) if !inner.is_empty() => {
                        out.push_str(&format!("{indent}{}:\n", key.blue().bold()));
                        pretty(value, depth + 1, out);
                    }
                    Value::Array(items) if !items.is_empty() => {
                        out.push_str(&format!("{indent}{}:\n", key.blue().bold()));
                        pretty(value, depth + 1, out);
                    }
                    other => {
                        out.push_str(&format!("{indent}{}: {}\n", key.blue().bold(), leaf(other)));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{indent}{}\n", "-".dimmed()));
                        pretty(item, depth + 1, out);
                    }
                    other => out.push_str(&format!("{indent}{} {}\n", "-".dimmed(), leaf(other))),
                }
            }
        }
        other => out.push_str(&format!("{indent}{}\n", leaf(other))),
    }
}

fn leaf(value: &Value) -> String {
    match value {
        Value::Null => "none".dimmed().to_string(),
        Value::Bool(flag) => flag.to_string().yellow().to_string(),
        Value::Number(number) => number.to_string().cyan().to_string(),
        Value::String(text) => text.green().to_string(),
        Value::Array(_) => "[]".dimmed().to_string(),
        Value::Object(_) => "{}".dimmed().to_string(),
    }
}
