use std::collections::HashMap;

use serde_json::Value;

use crate::commands::common::{optional_import_field_names, required_import_field_names};
use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct ParsedRow {
    pub(crate) row: i64,
    pub(crate) document_type: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) uploaded_at: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) notes: Option<String>,
}

pub(crate) fn parse_source(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Import source is empty."));
    }

    if looks_like_ndjson(trimmed) {
        return Err(ClientError::invalid_import_format(
            "NDJSON is not supported. Provide a JSON array or CSV.",
            "ndjson",
        ));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(ClientError::invalid_import_format(
            "JSON input must be a top-level array of upload objects.",
            "json_non_array",
        ));
    }

    Err(ClientError::invalid_import_format(
        "Unsupported import format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of upload objects.",
        ));
    };

    let mut rows = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects with upload fields.",
            ));
        };

        rows.push(ParsedRow {
            row: (index as i64) + 1,
            document_type: read_optional_string(object.get("document_type")),
            source: read_optional_string(object.get("source")),
            uploaded_at: read_optional_string(object.get("uploaded_at")),
            reference: read_optional_string(object.get("reference")),
            notes: read_optional_string(object.get("notes")),
        });
    }

    Ok(rows)
}

fn parse_csv(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !headers_are_valid(&headers) {
        return Err(ClientError::import_schema_mismatch(
            required_import_field_names()
                .iter()
                .map(|value| value.to_string())
                .collect(),
            optional_import_field_names()
                .iter()
                .map(|value| value.to_string())
                .collect(),
            headers,
        ));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;

        rows.push(ParsedRow {
            row: (row_index as i64) + 1,
            document_type: value_for(&record, &index_by_name, "document_type"),
            source: value_for(&record, &index_by_name, "source"),
            uploaded_at: value_for(&record, &index_by_name, "uploaded_at"),
            reference: value_for(&record, &index_by_name, "reference"),
            notes: value_for(&record, &index_by_name, "notes"),
        });
    }

    Ok(rows)
}

fn value_for(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    field_name: &str,
) -> Option<String> {
    let index = index_by_name.get(field_name)?;
    let value = record.get(*index)?;
    Some(value.to_string())
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    let current = value?;

    if current.is_null() {
        return None;
    }

    if let Some(string_value) = current.as_str() {
        return Some(string_value.to_string());
    }

    Some(current.to_string())
}

fn looks_like_ndjson(content: &str) -> bool {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<&str>>();
    if lines.len() < 2 {
        return false;
    }

    lines.iter().all(|line| {
        let parsed = serde_json::from_str::<Value>(line.trim());
        if let Ok(value) = parsed {
            return value.is_object();
        }
        false
    })
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}

fn headers_are_valid(actual_headers: &[String]) -> bool {
    let required_fields = required_import_field_names();
    let optional_fields = optional_import_field_names();

    for required in &required_fields {
        if !actual_headers.iter().any(|value| value == required) {
            return false;
        }
    }

    for header in actual_headers {
        let allowed = required_fields
            .iter()
            .any(|value| value == &header.as_str())
            || optional_fields
                .iter()
                .any(|value| value == &header.as_str());
        if !allowed {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::parse_source;

    #[test]
    fn json_array_rows_parse_in_order() {
        let body = r#"[
            {"document_type": "bank_statement", "source": "CBA", "uploaded_at": "2026-01-15"},
            {"document_type": "payg_summary", "source": "Acme", "uploaded_at": "2026-07-14", "reference": "payg-2026.pdf"}
        ]"#;
        let rows = parse_source(body);
        assert!(rows.is_ok());
        if let Ok(parsed) = rows {
            assert_eq!(parsed.len(), 2);
            assert_eq!(parsed[0].row, 1);
            assert_eq!(parsed[1].reference.as_deref(), Some("payg-2026.pdf"));
        }
    }

    #[test]
    fn csv_requires_the_schema_headers() {
        let body = "doc,who,when\nbank_statement,CBA,2026-01-15\n";
        let result = parse_source(body);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "import_schema_mismatch");
        }
    }

    #[test]
    fn csv_with_valid_headers_parses() {
        let body = "document_type,source,uploaded_at\nbank_statement,CBA,2026-01-15\n";
        let rows = parse_source(body);
        assert!(rows.is_ok());
        if let Ok(parsed) = rows {
            assert_eq!(parsed.len(), 1);
            assert_eq!(parsed[0].document_type.as_deref(), Some("bank_statement"));
        }
    }

    #[test]
    fn ndjson_is_rejected_with_a_format_hint() {
        let body = "{\"document_type\": \"a\"}\n{\"document_type\": \"b\"}\n";
        let result = parse_source(body);
        assert!(result.is_err());
    }

    #[test]
    fn non_array_json_is_rejected() {
        let result = parse_source("{\"document_type\": \"bank_statement\"}");
        assert!(result.is_err());
    }
}
