use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_scalar, result_of};

/// Format output as tables using the tabled crate.
///
/// The result's scalar fields form a two-column header table; each nested
/// array (schedule entries, comparison rows, chart points) gets a table of
/// its own below it.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            let scalars: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(_, v)| !v.is_array() && !v.is_object())
                .collect();
            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in &scalars {
                    builder.push_record([key.as_str(), &format_scalar(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in map {
                if let Value::Array(items) = val {
                    print_section(key, items);
                }
            }
        }
        Value::Array(items) => print_rows(items),
        _ => println!("{}", format_scalar(result)),
    }

    print_trailer(value);
}

fn print_section(name: &str, items: &[Value]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}:", name);

    // Chart series carry a label and their own points table
    let is_series = items
        .iter()
        .all(|item| item.get("points").map(Value::is_array).unwrap_or(false));
    if is_series {
        for item in items {
            if let Some(label) = item.get("label").and_then(Value::as_str) {
                println!("{}", label);
            }
            if let Some(Value::Array(points)) = item.get("points") {
                print_rows(points);
            }
        }
    } else {
        print_rows(items);
    }
}

fn print_rows(items: &[Value]) {
    let Some(Value::Object(first)) = items.first() else {
        for item in items {
            println!("{}", format_scalar(item));
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in items {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_trailer(value: &Value) {
    let Some(envelope) = value.as_object() else {
        return;
    };

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for warning in warnings {
                if let Value::String(s) = warning {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}
