use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_missing_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("missing list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No missing documents detected.",
            "",
            "Every tracked source is up to date, or Docket has not learned",
            "enough history yet. Run `docket patterns` to see what it knows.",
        ]
        .join("\n"));
    }

    let as_of = data.get("as_of").and_then(Value::as_str).unwrap_or("today");
    let overdue = rows
        .iter()
        .filter(|row| row.get("is_missing").and_then(Value::as_bool).unwrap_or(false))
        .count();
    let upcoming = rows.len() - overdue;

    let mut lines = vec![
        format!(
            "{overdue} overdue and {upcoming} upcoming document(s) as of {as_of}."
        ),
        String::new(),
        "Records:".to_string(),
    ];

    let columns = [
        Column {
            name: "Record",
            align: Align::Left,
        },
        Column {
            name: "Type",
            align: Align::Left,
        },
        Column {
            name: "Source",
            align: Align::Left,
        },
        Column {
            name: "Expected",
            align: Align::Left,
        },
        Column {
            name: "Days Overdue",
            align: Align::Right,
        },
        Column {
            name: "Status",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "missing_id").to_string(),
                value_str(row, "document_type").to_string(),
                value_str(row, "source").to_string(),
                value_str(row, "expected_date").to_string(),
                row.get("days_overdue")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
                value_str(row, "status").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Record",
    ));

    lines.push(String::new());
    lines.push("Close records with `docket missing uploaded <id>` or `docket missing dismiss <id>`.".to_string());

    Ok(lines.join("\n"))
}

pub fn render_missing_action(data: &Value) -> io::Result<String> {
    let missing_id = value_str(data, "missing_id");
    let status = value_str(data, "status");
    let message = value_str(data, "message");

    Ok(format!("Record `{missing_id}` is now {status}.\n\n{message}"))
}

fn value_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_missing_action, render_missing_list};

    #[test]
    fn empty_list_uses_a_plaintext_no_data_message() {
        let rendered = render_missing_list(&json!({ "rows": [], "as_of": "2026-07-01" }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("No missing documents detected."));
        }
    }

    #[test]
    fn overdue_and_upcoming_are_counted_separately() {
        let payload = json!({
            "as_of": "2026-07-01",
            "rows": [
                {
                    "missing_id": "mis_1",
                    "document_type": "bank_statement",
                    "source": "CBA",
                    "expected_date": "2026-06-14",
                    "days_overdue": 12,
                    "is_missing": true,
                    "status": "pending",
                },
                {
                    "missing_id": "mis_2",
                    "document_type": "payg_summary",
                    "source": "Acme",
                    "expected_date": "2026-07-05",
                    "days_overdue": 0,
                    "is_missing": false,
                    "status": "pending",
                },
            ],
        });
        let rendered = render_missing_list(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("1 overdue and 1 upcoming document(s) as of 2026-07-01."));
            assert!(text.contains("mis_1"));
            assert!(text.contains("mis_2"));
        }
    }

    #[test]
    fn action_render_confirms_the_new_status() {
        let payload = json!({
            "missing_id": "mis_1",
            "status": "dismissed",
            "message": "Record dismissed; no further reminders will be generated.",
        });
        let rendered = render_missing_action(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("`mis_1` is now dismissed"));
        }
    }
}
