use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, key_value_rows};

pub fn render_reminders(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("reminders output requires rows"))?;

    let as_of = data.get("as_of").and_then(Value::as_str).unwrap_or("today");

    if rows.is_empty() {
        let mut lines = vec![
            format!("No reminders to send as of {as_of}."),
            String::new(),
            "Nothing is overdue, nothing is due soon, or every eligible record".to_string(),
            "has reached its reminder cap.".to_string(),
        ];
        append_warnings(&mut lines, data);
        return Ok(lines.join("\n"));
    }

    let total = data
        .get("total_reminders")
        .and_then(Value::as_i64)
        .unwrap_or(rows.len() as i64);

    let mut lines = vec![
        format!("{total} reminder(s) ready as of {as_of}."),
        String::new(),
        "Reminders:".to_string(),
    ];

    let columns = [
        Column {
            name: "Urgency",
            align: Align::Left,
        },
        Column {
            name: "Kind",
            align: Align::Left,
        },
        Column {
            name: "Send On",
            align: Align::Left,
        },
        Column {
            name: "Title",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "urgency").to_string(),
                value_str(row, "reminder_type").to_string(),
                value_str(row, "scheduled_for").to_string(),
                value_str(row, "title").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Reminder",
    ));

    if let Some(by_urgency) = data.get("by_urgency") {
        lines.push(String::new());
        lines.push("By urgency:".to_string());
        lines.extend(key_value_rows(
            &[
                ("Critical:", count_str(by_urgency, "critical")),
                ("High:", count_str(by_urgency, "high")),
                ("Medium:", count_str(by_urgency, "medium")),
                ("Low:", count_str(by_urgency, "low")),
            ],
            2,
        ));
    }

    append_warnings(&mut lines, data);

    Ok(lines.join("\n"))
}

pub fn render_process(data: &Value) -> io::Result<String> {
    let as_of = data.get("as_of").and_then(Value::as_str).unwrap_or("today");
    let processed = data.get("processed").and_then(Value::as_i64).unwrap_or(0);
    let sent = data.get("sent").and_then(Value::as_i64).unwrap_or(0);
    let failed = data.get("failed").and_then(Value::as_i64).unwrap_or(0);

    if processed == 0 {
        return Ok(format!("No reminders were due as of {as_of}."));
    }

    let mut lines = vec![
        format!("Processed {processed} due reminder(s) as of {as_of}."),
        String::new(),
    ];
    lines.extend(key_value_rows(
        &[
            ("Sent:", sent.to_string()),
            ("Failed:", failed.to_string()),
        ],
        2,
    ));

    if let Some(errors) = data.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        lines.push(String::new());
        lines.push("Delivery failures:".to_string());
        for error in errors {
            if let Some(text) = error.as_str() {
                lines.push(format!("  - {text}"));
            }
        }
    }

    Ok(lines.join("\n"))
}

fn append_warnings(lines: &mut Vec<String>, data: &Value) {
    if let Some(warnings) = data.get("warnings").and_then(Value::as_array)
        && !warnings.is_empty()
    {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        for warning in warnings {
            if let Some(text) = warning.as_str() {
                lines.push(format!("  - {text}"));
            }
        }
    }
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
