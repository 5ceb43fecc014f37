pub(crate) mod dedupe;
pub(crate) mod input;
pub(crate) mod parse;
pub(crate) mod persist;
pub(crate) mod validate;

use std::path::PathBuf;

use chrono::NaiveDate;
use rusqlite::TransactionBehavior;

use crate::analysis::refresh::run_analysis_in_transaction;
use crate::contracts::types::{ImportSummary, RefreshSummaryData};
use crate::setup::SetupContext;
use crate::state::open_connection;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct CanonicalUpload {
    pub document_type: String,
    pub source: String,
    pub uploaded_at: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ImportExecutionResult {
    pub dry_run: bool,
    pub import_id: Option<String>,
    pub message: String,
    pub summary: ImportSummary,
    pub source_used: Option<String>,
    pub refreshed: Option<RefreshSummaryData>,
}

/// Validate, dedupe, persist, and re-analyze in one transaction.
///
/// Dry runs stop after tracker-level dedupe and roll everything back, so a
/// dry run is byte-for-byte the same validation the commit would apply.
pub(crate) fn execute(
    setup: &SetupContext,
    path: Option<String>,
    dry_run: bool,
    stdin_override: Option<String>,
    as_of: NaiveDate,
) -> ClientResult<ImportExecutionResult> {
    let resolved_source = input::resolve_source(path, stdin_override)?;
    let parsed_rows = parse::parse_source(&resolved_source.content)?;
    let validated = validate::validate_rows(parsed_rows)?;
    let batch = dedupe::dedupe_batch(validated.rows);

    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| crate::state::map_sqlite_error(&db_path, &error))?;

    let existing = dedupe::dedupe_against_existing(&transaction, &db_path, batch.insertable)?;
    let deduped_total = batch.deduped + existing.deduped;

    if dry_run {
        transaction
            .rollback()
            .map_err(|error| crate::state::map_sqlite_error(&db_path, &error))?;

        return Ok(ImportExecutionResult {
            dry_run: true,
            import_id: None,
            message: "Validation passed. No rows were written.".to_string(),
            summary: ImportSummary {
                rows_read: validated.summary.rows_read,
                rows_valid: validated.summary.rows_valid,
                rows_invalid: validated.summary.rows_invalid,
                inserted: 0,
                deduped: deduped_total,
            },
            source_used: resolved_source.source_used,
            refreshed: None,
        });
    }

    let persisted = persist::persist_import(
        &transaction,
        &db_path,
        persist::PersistInput {
            rows: &existing.insertable,
            rows_read: validated.summary.rows_read,
            rows_valid: validated.summary.rows_valid,
            rows_invalid: validated.summary.rows_invalid,
            deduped: deduped_total,
            source_kind: resolved_source.source_kind.as_str(),
            source_ref: resolved_source.source_ref.as_deref(),
        },
    )?;

    // Every import reruns the analysis so patterns, missing documents, and
    // calendar deadlines stay in step with the upload history.
    let analysis = run_analysis_in_transaction(&transaction, &db_path, as_of)?;

    transaction
        .commit()
        .map_err(|error| crate::state::map_sqlite_error(&db_path, &error))?;

    Ok(ImportExecutionResult {
        dry_run: false,
        import_id: Some(persisted.import_id),
        message: "Import completed successfully.".to_string(),
        summary: ImportSummary {
            rows_read: validated.summary.rows_read,
            rows_valid: validated.summary.rows_valid,
            rows_invalid: validated.summary.rows_invalid,
            inserted: persisted.inserted,
            deduped: deduped_total,
        },
        source_used: resolved_source.source_used,
        refreshed: Some(RefreshSummaryData {
            patterns_detected: analysis.patterns_detected,
            missing_detected: analysis.missing_detected,
        }),
    })
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide JSON array or CSV input via path or stdin.".to_string(),
            "Run `docket import create --help` to confirm import field requirements.".to_string(),
        ],
    )
    .with_import_help()
}
