pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print the envelope; decimals are already strings so no precision is lost.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The `result` payload of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value.get("result").unwrap_or(value)
}

/// Render one JSON value as a text cell. Rate brackets read `[start, +increment)`,
/// `null` (an undefined ratio or risk tier) becomes `missing`.
pub(crate) fn cell(value: &Value, missing: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => missing.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| cell(v, missing))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => match (map.get("start"), map.get("increment")) {
            (Some(Value::String(start)), Some(Value::String(inc))) => {
                format!("[{start}, +{inc})")
            }
            _ => value.to_string(),
        },
    }
}
