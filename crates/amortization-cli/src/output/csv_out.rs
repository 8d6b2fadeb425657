use serde_json::{Map, Value};
use std::io;

use super::{flatten_fields, format_scalar, result_of};

/// Write output as CSV to stdout.
///
/// A result with a `schedule` writes one line per period; otherwise the
/// result is written as two-column `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match result_of(value) {
        Value::Object(result) => match result.get("schedule") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_fields(&mut wtr, result),
        },
        Value::Array(rows) => write_rows(&mut wtr, rows),
        other => wtr.write_record([format_scalar(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write CSV output");
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_fields(result) {
        wtr.write_record([key, format_scalar(&val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in rows {
        if let Value::Object(map) = item {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_rows_become_csv_lines() {
        let rows = json!([
            { "period": 1, "remaining_balance": "50" },
            { "period": 2, "remaining_balance": "0" },
        ]);
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, rows.as_array().unwrap()).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text, "period,remaining_balance\n1,50\n2,0\n");
    }
}
