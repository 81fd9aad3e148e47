use serde_json::Value;
use std::io;

use super::{format_scalar, result_of};

/// Write output as CSV to stdout.
///
/// Schedule entries and chart points become row tables; anything else
/// falls back to two-column field,value records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(entries)) = map.get("entries") {
                write_rows(&mut wtr, entries);
            } else if has_series(map) {
                write_series(&mut wtr, map);
            } else if let Some(rows) = comparison_rows(map) {
                for (section, items) in rows {
                    let _ = wtr.write_record([section]);
                    write_rows(&mut wtr, items);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    if !val.is_array() && !val.is_object() {
                        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
                    }
                }
            }
        }
        Value::Array(items) => write_rows(&mut wtr, items),
        _ => {
            let _ = wtr.write_record([&format_scalar(result)]);
        }
    }

    let _ = wtr.flush();
}

fn has_series(map: &serde_json::Map<String, Value>) -> bool {
    ["loans", "houses"].iter().any(|key| {
        map.get(*key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .any(|item| item.get("points").map(Value::is_array).unwrap_or(false))
            })
            .unwrap_or(false)
    })
}

/// Flatten every series into (kind, label, amount, monthly, total) rows.
fn write_series(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["kind", "label", "amount", "monthly", "total"]);
    for kind in ["loans", "houses"] {
        let Some(Value::Array(series_list)) = map.get(kind) else {
            continue;
        };
        for series in series_list {
            let label = series.get("label").and_then(Value::as_str).unwrap_or("");
            let Some(Value::Array(points)) = series.get("points") else {
                continue;
            };
            for point in points {
                let _ = wtr.write_record([
                    kind,
                    label,
                    &field(point, "amount"),
                    &field(point, "monthly"),
                    &field(point, "total"),
                ]);
            }
        }
    }
}

fn comparison_rows(
    map: &serde_json::Map<String, Value>,
) -> Option<Vec<(&'static str, &Vec<Value>)>> {
    let mut sections = Vec::new();
    for kind in ["loans", "houses"] {
        if let Some(Value::Array(items)) = map.get(kind) {
            if !items.is_empty() {
                sections.push((kind, items));
            }
        }
    }
    if sections.is_empty() {
        None
    } else {
        Some(sections)
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, items: &[Value]) {
    let Some(Value::Object(first)) = items.first() else {
        for item in items {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for item in items {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn field(point: &Value, name: &str) -> String {
    point.get(name).map(format_scalar).unwrap_or_default()
}
