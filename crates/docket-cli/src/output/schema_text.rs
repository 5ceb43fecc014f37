use std::io;

use serde_json::Value;

use super::format::key_value_rows;

pub fn render_schema_summary(data: &Value) -> io::Result<String> {
    let db_path = data
        .get("db_path")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("schema output requires db_path"))?;
    let schema_version = data
        .get("schema_version")
        .and_then(Value::as_str)
        .unwrap_or("v1");

    let mut lines = vec!["Docket local storage".to_string(), String::new()];
    lines.extend(key_value_rows(
        &[
            ("Database:", db_path.to_string()),
            ("Schema version:", schema_version.to_string()),
        ],
        2,
    ));

    if let Some(range) = data.get("data_range") {
        let earliest = range.get("earliest").and_then(Value::as_str);
        let latest = range.get("latest").and_then(Value::as_str);
        if earliest.is_some() || latest.is_some() {
            lines.push(String::new());
            lines.push(format!(
                "  Uploads cover:  {} to {}",
                earliest.unwrap_or("unknown"),
                latest.unwrap_or("unknown")
            ));
        }
    }

    if let Some(views) = data.get("public_views").and_then(Value::as_array) {
        lines.push(String::new());
        lines.push("Public views (stable read contracts):".to_string());
        for view in views {
            if let Some(name) = view.get("name").and_then(Value::as_str) {
                lines.push(format!("  {name}"));
            }
        }
        lines.push(String::new());
        lines.push("Run `docket db schema view <name>` for column details.".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn render_schema_view(data: &Value) -> io::Result<String> {
    let view = data
        .get("view")
        .ok_or_else(|| io::Error::other("schema view output requires a view"))?;
    let name = view
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let mut lines = vec![format!("View {name}"), String::new(), "Columns:".to_string()];

    if let Some(columns) = view.get("columns").and_then(Value::as_array) {
        let entries = columns
            .iter()
            .map(|column| {
                (
                    column.get("name").and_then(Value::as_str).unwrap_or(""),
                    column
                        .get("column_type")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string(),
                )
            })
            .collect::<Vec<(&str, String)>>();
        lines.extend(key_value_rows(&entries, 2));
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_schema_summary, render_schema_view};

    #[test]
    fn summary_lists_views_and_path() {
        let payload = json!({
            "db_path": "/home/user/.docket/tracker.db",
            "schema_version": "v1",
            "data_range": { "earliest": "2026-01-15", "latest": "2026-06-15" },
            "public_views": [
                { "name": "v1_uploads" },
                { "name": "v1_patterns" },
            ],
        });
        let rendered = render_schema_summary(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("/home/user/.docket/tracker.db"));
            assert!(text.contains("v1_patterns"));
            assert!(text.contains("Uploads cover:"));
        }
    }

    #[test]
    fn view_render_lists_columns() {
        let payload = json!({
            "view": {
                "name": "v1_patterns",
                "columns": [
                    { "name": "pattern_id", "column_type": "text", "nullable": false },
                    { "name": "next_expected_date", "column_type": "date|null", "nullable": true },
                ],
            },
        });
        let rendered = render_schema_view(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("View v1_patterns"));
            assert!(text.contains("next_expected_date"));
        }
    }
}
