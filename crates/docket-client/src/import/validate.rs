use std::collections::HashSet;

use chrono::NaiveDate;

use crate::analysis::date::looks_like_iso_date;
use crate::contracts::types::{ImportIssue, ImportSummary};
use crate::import::CanonicalUpload;
use crate::import::parse::ParsedRow;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct ValidatedRows {
    pub(crate) rows: Vec<CanonicalUpload>,
    pub(crate) summary: ImportSummary,
}

pub(crate) fn validate_rows(parsed_rows: Vec<ParsedRow>) -> ClientResult<ValidatedRows> {
    let total_rows = parsed_rows.len();
    let mut rows = Vec::new();
    let mut issues = Vec::new();

    for raw in parsed_rows {
        let mut row_issues = Vec::new();

        let document_type = validate_required_string(
            raw.row,
            "document_type",
            raw.document_type,
            &mut row_issues,
            "document_type must be present and non-empty.",
        );
        let source = validate_required_string(
            raw.row,
            "source",
            raw.source,
            &mut row_issues,
            "source must be present and non-empty.",
        );
        let uploaded_at = validate_uploaded_at(raw.row, raw.uploaded_at, &mut row_issues);
        let reference = normalize_optional(raw.reference);
        let notes = normalize_optional(raw.notes);

        if row_issues.is_empty() {
            rows.push(CanonicalUpload {
                document_type: document_type.unwrap_or_default(),
                source: source.unwrap_or_default(),
                uploaded_at: uploaded_at.unwrap_or_default(),
                reference,
                notes,
            });
        } else {
            issues.extend(row_issues);
        }
    }

    let summary = ImportSummary {
        rows_read: total_rows as i64,
        rows_valid: rows.len() as i64,
        rows_invalid: issues
            .iter()
            .map(|issue| issue.row)
            .collect::<HashSet<i64>>()
            .len() as i64,
        inserted: 0,
        deduped: 0,
    };

    if !issues.is_empty() {
        return Err(ClientError::import_validation_failed(summary, issues));
    }

    Ok(ValidatedRows { rows, summary })
}

fn validate_required_string(
    row: i64,
    field: &str,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
    description: &str,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(ImportIssue {
            row,
            field: field.to_string(),
            code: "missing_required_field".to_string(),
            description: description.to_string(),
            expected: Some("non-empty string".to_string()),
            received: Some(String::new()),
        });
    }
    normalized
}

fn validate_uploaded_at(
    row: i64,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
) -> Option<String> {
    let normalized = normalize_optional(value);
    let Some(candidate) = normalized else {
        issues.push(ImportIssue {
            row,
            field: "uploaded_at".to_string(),
            code: "missing_required_field".to_string(),
            description: "uploaded_at must be present and non-empty.".to_string(),
            expected: Some("YYYY-MM-DD".to_string()),
            received: Some(String::new()),
        });
        return None;
    };

    if !looks_like_iso_date(&candidate)
        || NaiveDate::parse_from_str(&candidate, "%Y-%m-%d").is_err()
    {
        issues.push(ImportIssue {
            row,
            field: "uploaded_at".to_string(),
            code: "invalid_date".to_string(),
            description: format!("uploaded_at must be YYYY-MM-DD; got \"{candidate}\""),
            expected: Some("YYYY-MM-DD".to_string()),
            received: Some(candidate),
        });
        return None;
    }

    Some(candidate)
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
