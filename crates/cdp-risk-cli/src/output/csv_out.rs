use serde_json::Value;
use std::io;

use super::{cell, result_of};

/// Write the result as CSV on stdout: one row per bracket for distributions,
/// otherwise `field,value` pairs.
pub fn print_csv(value: &Value) {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    let written = write_result(&mut wtr, result_of(value))
        .and_then(|()| wtr.flush().map_err(csv::Error::from));
    if let Err(e) = written {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_result<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) -> csv::Result<()> {
    if let Some(rows) = result.get("brackets").and_then(Value::as_array) {
        return write_rows(wtr, rows);
    }
    match result {
        Value::Array(rows) => write_rows(wtr, rows),
        Value::Object(fields) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in fields {
                wtr.write_record([key.as_str(), &cell(val, "")])?;
            }
            Ok(())
        }
        other => wtr.write_record([cell(other, "")]),
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([cell(row, "")])?;
        }
        return Ok(());
    };

    let columns: Vec<&String> = first.keys().collect();
    wtr.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.get(c.as_str()).map(|v| cell(v, "")).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}
