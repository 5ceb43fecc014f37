use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, key_value_rows};

pub fn render_analyze(data: &Value) -> io::Result<String> {
    let run_id = data.get("run_id").and_then(Value::as_str).unwrap_or("unknown");
    let as_of = data.get("as_of").and_then(Value::as_str).unwrap_or("today");

    let mut lines = vec![
        format!("Analysis run {run_id} completed as of {as_of}."),
        String::new(),
        "Results:".to_string(),
    ];
    lines.extend(key_value_rows(
        &[
            ("Sources analyzed:", count_str(data, "total_sources")),
            ("Patterns detected:", count_str(data, "patterns_detected")),
            ("Missing detected:", count_str(data, "missing_detected")),
            ("Deadlines created:", count_str(data, "deadlines_created")),
            ("Duration:", format!("{} ms", count_str(data, "duration_ms"))),
        ],
        2,
    ));

    if let Some(errors) = data.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        lines.push(String::new());
        lines.push(format!("{} source(s) failed:", errors.len()));
        for error in errors {
            if let Some(text) = error.as_str() {
                lines.push(format!("  - {text}"));
            }
        }
    }

    lines.push(String::new());
    lines.push("Next: run `docket missing list` or `docket reminders list`.".to_string());

    Ok(lines.join("\n"))
}

pub fn render_deadlines(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("deadlines output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No calendar deadlines registered.",
            "",
            "Deadlines are created during analysis for missing documents with",
            "high or medium confidence patterns.",
        ]
        .join("\n"));
    }

    let mut lines = vec![
        format!("{} calendar deadline(s) registered.", rows.len()),
        String::new(),
        "Deadlines:".to_string(),
    ];

    let columns = [
        Column {
            name: "Due",
            align: Align::Left,
        },
        Column {
            name: "Title",
            align: Align::Left,
        },
        Column {
            name: "Record",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "due_date").to_string(),
                value_str(row, "title").to_string(),
                value_str(row, "missing_id").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Deadline",
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_analyze, render_deadlines};

    #[test]
    fn analysis_summary_lists_counts_and_errors() {
        let payload = json!({
            "run_id": "run_1",
            "as_of": "2026-07-01",
            "total_sources": 3,
            "patterns_detected": 2,
            "missing_detected": 1,
            "deadlines_created": 1,
            "duration_ms": 12,
            "errors": ["source `bank_statement`/`CBA`: disk full"],
        });
        let rendered = render_analyze(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Analysis run run_1 completed as of 2026-07-01."));
            assert!(text.contains("Sources analyzed:"));
            assert!(text.contains("1 source(s) failed:"));
        }
    }

    #[test]
    fn empty_deadlines_explain_the_confidence_gate() {
        let rendered = render_deadlines(&json!({ "rows": [] }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("high or medium confidence"));
        }
    }
}
