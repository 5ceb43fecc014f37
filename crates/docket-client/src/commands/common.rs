use chrono::NaiveDate;

use crate::ClientResult;
use crate::analysis::date::parse_iso_date_strict;
use crate::contracts::types::{DataRange, DataRangeHint, PublicView, ViewColumn};

const REQUIRED_IMPORT_FIELDS: [(&str, &str); 3] = [
    ("document_type", "string"),
    ("source", "string"),
    ("uploaded_at", "date"),
];

const OPTIONAL_IMPORT_FIELDS: [(&str, &str); 2] =
    [("reference", "string|null"), ("notes", "string|null")];

pub(crate) fn required_import_field_names() -> Vec<&'static str> {
    REQUIRED_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn optional_import_field_names() -> Vec<&'static str> {
    OPTIONAL_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub fn public_view_contracts() -> Vec<PublicView> {
    vec![
        PublicView {
            name: "v1_uploads".to_string(),
            columns: vec![
                view_column("upload_id", "text"),
                view_column("import_id", "text"),
                view_column("document_type", "text"),
                view_column("source", "text"),
                view_column("uploaded_at", "date"),
                view_column("reference", "text|null"),
                view_column("notes", "text|null"),
            ],
        },
        PublicView {
            name: "v1_patterns".to_string(),
            columns: vec![
                view_column("pattern_id", "text"),
                view_column("document_type", "text"),
                view_column("source", "text"),
                view_column("frequency", "text"),
                view_column("stability", "text"),
                view_column("confidence", "text"),
                view_column("average_interval_days", "real|null"),
                view_column("uploads_analyzed", "integer"),
                view_column("last_upload_date", "date|null"),
                view_column("next_expected_date", "date|null"),
            ],
        },
        PublicView {
            name: "v1_missing_documents".to_string(),
            columns: vec![
                view_column("missing_id", "text"),
                view_column("pattern_id", "text"),
                view_column("document_type", "text"),
                view_column("source", "text"),
                view_column("expected_date", "date"),
                view_column("grace_period_end", "date"),
                view_column("days_overdue", "integer"),
                view_column("is_missing", "integer"),
                view_column("confidence", "text"),
                view_column("status", "text"),
            ],
        },
        PublicView {
            name: "v1_reminder_settings".to_string(),
            columns: vec![
                view_column("document_type", "text"),
                view_column("enabled", "integer"),
                view_column("reminder_days_before", "integer"),
                view_column("reminder_days_after", "integer"),
                view_column("email_notifications", "integer"),
                view_column("push_notifications", "integer"),
                view_column("max_reminders", "integer"),
            ],
        },
        PublicView {
            name: "v1_analysis_runs".to_string(),
            columns: vec![
                view_column("run_id", "text"),
                view_column("started_at", "text"),
                view_column("duration_ms", "integer"),
                view_column("total_sources", "integer"),
                view_column("patterns_detected", "integer"),
                view_column("missing_detected", "integer"),
                view_column("errors", "text"),
            ],
        },
    ]
}

pub fn data_range_hint(data_range: &DataRange) -> DataRangeHint {
    DataRangeHint {
        earliest: data_range.earliest.clone(),
        latest: data_range.latest.clone(),
    }
}

/// Resolve an optional `--as-of` argument, defaulting to the local date.
pub(crate) fn resolve_as_of(value: Option<&str>, command: &str) -> ClientResult<NaiveDate> {
    match value {
        Some(raw) => parse_iso_date_strict(raw, "as-of", command),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn view_column(name: &str, column_type: &str) -> ViewColumn {
    ViewColumn {
        name: name.to_string(),
        column_type: column_type.to_string(),
        nullable: column_type.ends_with("|null"),
    }
}
