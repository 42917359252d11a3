use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, result_of};

const MISSING: &str = "-";

/// Field/value table of the headline numbers, one extra table per row list
/// (bracket aggregates, rate curves), then warnings and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(fields) => {
            let (scalars, row_lists) = split_fields(fields);
            println!("{}", field_table(&scalars));
            for (name, rows) in row_lists {
                println!("\n{name}:");
                println!("{}", row_table(rows));
            }
        }
        Value::Array(rows) => println!("{}", row_table(rows)),
        other => println!("{}", cell(other, MISSING)),
    }

    if let Some(envelope) = value.as_object().filter(|m| m.contains_key("result")) {
        print_notes(envelope);
    }
}

/// Separate arrays of objects, which render as their own tables, from the
/// scalar fields of a result.
fn split_fields(fields: &Map<String, Value>) -> (Vec<(&str, &Value)>, Vec<(&str, &[Value])>) {
    let mut scalars = Vec::new();
    let mut row_lists = Vec::new();
    for (key, val) in fields {
        match val {
            Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
                row_lists.push((key.as_str(), rows.as_slice()))
            }
            _ => scalars.push((key.as_str(), val)),
        }
    }
    (scalars, row_lists)
}

fn field_table(fields: &[(&str, &Value)]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.to_string(), cell(val, MISSING)]);
    }
    builder.build()
}

/// Columns come from the first row; rows missing a column show `-`.
fn row_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    let columns: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    };
    builder.push_record(columns.clone());
    for row in rows {
        let record: Vec<String> = match row {
            Value::Object(map) => columns
                .iter()
                .map(|c| map.get(c).map_or_else(|| MISSING.to_string(), |v| cell(v, MISSING)))
                .collect(),
            other => vec![cell(other, MISSING)],
        };
        builder.push_record(record);
    }
    builder.build()
}

fn print_notes(envelope: &Map<String, Value>) {
    let warnings: Vec<&str> = envelope
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {w}");
        }
    }
    if let Some(methodology) = envelope.get("methodology").and_then(Value::as_str) {
        println!("\nMethodology: {methodology}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_brackets_split_into_own_table() {
        let result = json!({
            "total_debt": "3500",
            "brackets": [
                {"bracket": {"start": "0.01", "increment": "0.001"}, "debt": "1000"},
                {"bracket": {"start": "0.08", "increment": "0.005"}, "debt": "500"}
            ]
        });
        let (scalars, row_lists) = split_fields(result.as_object().unwrap());
        assert_eq!(scalars.len(), 1);
        assert_eq!(row_lists.len(), 1);
        assert_eq!(row_lists[0].0, "brackets");

        let rendered = row_table(row_lists[0].1).to_string();
        assert!(rendered.contains("[0.01, +0.001)"), "{rendered}");
        assert!(rendered.contains("500"), "{rendered}");
    }

    #[test]
    fn test_undefined_risk_shows_dash() {
        let result = json!({"ltv": "0", "liquidation_risk": null});
        let (scalars, _) = split_fields(result.as_object().unwrap());
        let rendered = field_table(&scalars).to_string();
        assert!(rendered.contains("liquidation_risk"));
        assert!(rendered.contains(" - "), "{rendered}");
    }
}
