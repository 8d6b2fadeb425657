pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Row-per-period arrays that render as their own table or CSV.
pub(crate) const ROW_SECTIONS: [&str; 2] = ["schedule", "annual"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of an output envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted keys (`summary.total_interest_paid`),
/// skipping the row sections.
pub(crate) fn flatten_fields(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    collect_fields("", map, &mut fields);
    fields
}

fn collect_fields(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        if prefix.is_empty() && ROW_SECTIONS.contains(&key.as_str()) {
            continue;
        }
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => collect_fields(&name, inner, out),
            _ => out.push((name, val.clone())),
        }
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_skips_rows_and_dots_nested_keys() {
        let value = json!({
            "opening_balance": "1000",
            "summary": { "total_interest_paid": "12.5" },
            "schedule": [ { "period": 1 } ],
        });
        let fields = flatten_fields(value.as_object().unwrap());
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["opening_balance", "summary.total_interest_paid"]);
    }
}
