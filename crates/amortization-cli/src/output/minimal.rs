use serde_json::Value;

use super::{flatten_fields, format_scalar, result_of};

/// Key figures in priority order; the first one present is printed.
const PRIORITY_KEYS: [&str; 7] = [
    "comparison.interest_saved",
    "interest_saved",
    "total_monthly_payment",
    "difference.total_cost",
    "periodic_payment",
    "summary.periodic_payment",
    "summary.total_interest_paid",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    if let Value::Object(map) = result_obj {
        let fields = flatten_fields(map);
        for key in PRIORITY_KEYS {
            if let Some((_, val)) = fields.iter().find(|(k, v)| k == key && !v.is_null()) {
                println!("{}", format_scalar(val));
                return;
            }
        }

        if let Some((key, val)) = fields.first() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
