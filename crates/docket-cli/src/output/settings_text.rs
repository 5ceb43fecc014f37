use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_settings_show(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("settings output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No reminder settings stored yet.",
            "",
            "Every document type currently uses its built-in defaults.",
            "Change one with `docket settings set <type> --enabled false`.",
        ]
        .join("\n"));
    }

    let mut lines = vec![
        format!("{} document type(s) configured.", rows.len()),
        String::new(),
        "Settings:".to_string(),
    ];

    lines.extend(format::render_table_or_blocks(
        &settings_columns(),
        &settings_rows(rows),
        format::terminal_width(),
        "Setting",
    ));

    Ok(lines.join("\n"))
}

pub fn render_settings_set(data: &Value) -> io::Result<String> {
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Settings updated.");
    let row = data
        .get("row")
        .ok_or_else(|| io::Error::other("settings update output requires a row"))?;

    let mut lines = vec![message.to_string(), String::new()];
    lines.extend(format::render_table_or_blocks(
        &settings_columns(),
        &settings_rows(std::slice::from_ref(row)),
        format::terminal_width(),
        "Setting",
    ));

    Ok(lines.join("\n"))
}

fn settings_columns() -> [Column<'static>; 6] {
    [
        Column {
            name: "Type",
            align: Align::Left,
        },
        Column {
            name: "Enabled",
            align: Align::Left,
        },
        Column {
            name: "Before/After",
            align: Align::Left,
        },
        Column {
            name: "Email",
            align: Align::Left,
        },
        Column {
            name: "Push",
            align: Align::Left,
        },
        Column {
            name: "Max",
            align: Align::Right,
        },
    ]
}

fn settings_rows(rows: &[Value]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            vec![
                row.get("document_type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                bool_str(row, "enabled"),
                format!(
                    "{}d/{}d",
                    row.get("reminder_days_before")
                        .and_then(Value::as_i64)
                        .unwrap_or(0),
                    row.get("reminder_days_after")
                        .and_then(Value::as_i64)
                        .unwrap_or(0)
                ),
                bool_str(row, "email_notifications"),
                bool_str(row, "push_notifications"),
                row.get("max_reminders")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
            ]
        })
        .collect()
}

fn bool_str(row: &Value, key: &str) -> String {
    if row.get(key).and_then(Value::as_bool).unwrap_or(false) {
        "on".to_string()
    } else {
        "off".to_string()
    }
}
