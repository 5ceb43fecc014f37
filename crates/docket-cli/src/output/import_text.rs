use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, key_value_rows};

pub fn render_import_run(data: &Value) -> io::Result<String> {
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Import finished.");
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("import output requires a summary"))?;

    let mut lines = vec![message.to_string(), String::new(), "Summary:".to_string()];
    lines.extend(key_value_rows(
        &[
            ("Rows read:", count_str(summary, "rows_read")),
            ("Rows valid:", count_str(summary, "rows_valid")),
            ("Rows invalid:", count_str(summary, "rows_invalid")),
            ("Inserted:", count_str(summary, "inserted")),
            ("Deduped:", count_str(summary, "deduped")),
        ],
        2,
    ));

    if let Some(import_id) = data.get("import_id").and_then(Value::as_str) {
        lines.push(String::new());
        lines.push(format!("Import id: {import_id}"));
    }

    if let Some(refreshed) = data.get("refreshed")
        && !refreshed.is_null()
    {
        lines.push(String::new());
        lines.push("Analysis refreshed:".to_string());
        lines.extend(key_value_rows(
            &[
                ("Patterns:", count_str(refreshed, "patterns_detected")),
                ("Missing:", count_str(refreshed, "missing_detected")),
            ],
            2,
        ));
        lines.push(String::new());
        lines.push("Next: run `docket patterns` or `docket missing list`.".to_string());
    } else {
        lines.push(String::new());
        lines.push("Next: rerun without --dry-run to commit this import.".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn render_import_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("import list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No imports recorded yet.",
            "",
            "Run `docket import create <path>` to load your upload history.",
        ]
        .join("\n"));
    }

    let mut lines = vec![
        format!("{} import(s) recorded.", rows.len()),
        String::new(),
        "Imports:".to_string(),
    ];

    let columns = [
        Column {
            name: "Import",
            align: Align::Left,
        },
        Column {
            name: "Status",
            align: Align::Left,
        },
        Column {
            name: "Read",
            align: Align::Right,
        },
        Column {
            name: "Inserted",
            align: Align::Right,
        },
        Column {
            name: "Deduped",
            align: Align::Right,
        },
        Column {
            name: "Source",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "import_id").to_string(),
                value_str(row, "status").to_string(),
                count_str(row, "rows_read"),
                count_str(row, "inserted"),
                count_str(row, "deduped"),
                row.get("source_ref")
                    .and_then(Value::as_str)
                    .or_else(|| row.get("source_kind").and_then(Value::as_str))
                    .unwrap_or("-")
                    .to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Import",
    ));

    Ok(lines.join("\n"))
}

fn count_str(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_i64)
        .unwrap_or(0)
        .to_string()
}

fn value_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("unknown")
}
