use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_patterns(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("patterns output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No upload patterns learned yet.",
            "",
            "Docket needs at least two uploads from the same source before it",
            "can infer a cadence. Import your upload history to get started.",
        ]
        .join("\n"));
    }

    let from = data.get("from").and_then(Value::as_str);
    let to = data.get("to").and_then(Value::as_str);

    let mut lines = vec![
        patterns_heading(rows.len(), from, to),
        String::new(),
        "Patterns:".to_string(),
    ];

    let columns = [
        Column {
            name: "Type",
            align: Align::Left,
        },
        Column {
            name: "Source",
            align: Align::Left,
        },
        Column {
            name: "Frequency",
            align: Align::Left,
        },
        Column {
            name: "Confidence",
            align: Align::Left,
        },
        Column {
            name: "Uploads",
            align: Align::Right,
        },
        Column {
            name: "Next Expected",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_str(row, "document_type").to_string(),
                value_str(row, "source").to_string(),
                value_str(row, "frequency").to_string(),
                value_str(row, "confidence").to_string(),
                row.get("uploads_analyzed")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
                display_or_dash(row.get("next_expected_date")),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Pattern",
    ));

    let changed = rows
        .iter()
        .filter(|row| {
            row.get("pattern_changes")
                .and_then(Value::as_array)
                .map(|changes| !changes.is_empty())
                .unwrap_or(false)
        })
        .count();
    if changed > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{changed} source(s) have shifted cadence over time; see --json for the change history."
        ));
    }

    if let Some(range_hint) = data.get("data_range_hint") {
        let earliest = range_hint.get("earliest").and_then(Value::as_str);
        let latest = range_hint.get("latest").and_then(Value::as_str);
        if earliest.is_some() || latest.is_some() {
            lines.push(String::new());
            lines.push(format!(
                "Data covers:  {} to {}",
                earliest.unwrap_or("unknown"),
                latest.unwrap_or("unknown")
            ));
        }
    }

    Ok(lines.join("\n"))
}

fn patterns_heading(count: usize, from: Option<&str>, to: Option<&str>) -> String {
    match (from, to) {
        (Some(start), Some(end)) => {
            format!("{count} upload patterns learned from {start} to {end}.")
        }
        (Some(start), None) => format!("{count} upload patterns learned from {start} onward."),
        (None, Some(end)) => format!("{count} upload patterns learned up to {end}."),
        (None, None) => format!("{count} upload patterns learned."),
    }
}

fn display_or_dash(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => "-".to_string(),
    }
}

fn value_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_patterns;

    #[test]
    fn empty_patterns_use_a_plaintext_no_data_message() {
        let rendered = render_patterns(&json!({ "rows": [] }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("No upload patterns learned yet."));
        }
    }

    #[test]
    fn patterns_render_with_next_expected_dates() {
        let payload = json!({
            "rows": [{
                "document_type": "bank_statement",
                "source": "CBA",
                "frequency": "monthly",
                "confidence": "high",
                "uploads_analyzed": 6,
                "next_expected_date": "2026-07-15",
                "pattern_changes": [],
            }],
        });
        let rendered = render_patterns(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("1 upload patterns learned."));
            assert!(text.contains("2026-07-15"));
        }
    }
}
