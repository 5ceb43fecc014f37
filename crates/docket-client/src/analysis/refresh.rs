use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use ulid::Ulid;

use crate::ClientResult;
use crate::analysis::calendar::{TaxDeadline, deadline_from_missing};
use crate::analysis::date::format_iso_date;
use crate::analysis::missing::{MissingDocument, detect_missing};
use crate::analysis::pattern::{DocumentPattern, detect_patterns};
use crate::analysis::query::load_uploads;
use crate::analysis::types::{AnalysisFilter, Frequency, MissingStatus, UploadEvent, pattern_key};
use crate::state::map_sqlite_error;
use crate::store;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run_id: String,
    pub patterns: Vec<DocumentPattern>,
    pub total_sources: i64,
    pub patterns_detected: i64,
    pub missing_detected: i64,
    pub deadlines_created: i64,
    pub duration_ms: i64,
    pub errors: Vec<String>,
}

/// One full analysis pass: recompute patterns wholesale, reconcile missing
/// document records, rebuild calendar deadlines, record the run.
///
/// A failing source never aborts the batch; its error lands in `errors`
/// while every healthy source still persists.
pub fn run_analysis(
    connection: &mut Connection,
    db_path: &Path,
    as_of: NaiveDate,
) -> ClientResult<AnalysisOutcome> {
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let outcome = run_analysis_in_transaction(&transaction, db_path, as_of)?;
    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(outcome)
}

pub fn run_analysis_in_transaction(
    transaction: &Transaction<'_>,
    db_path: &Path,
    as_of: NaiveDate,
) -> ClientResult<AnalysisOutcome> {
    let started = Instant::now();
    let started_at = store::now_timestamp();
    let run_id = format!("run_{}", Ulid::new());
    let timestamp = store::now_timestamp();
    let mut errors: Vec<String> = Vec::new();

    let filter = AnalysisFilter {
        from: None,
        to: None,
    };
    let uploads = load_uploads(transaction, db_path, &filter)?;
    let previous = store::load_patterns(transaction, db_path)?;
    let classified = detect_patterns(&uploads, &previous, as_of);
    let total_sources = classified.len() as i64;

    store::delete_all_patterns(transaction, db_path)?;
    let mut persisted: Vec<DocumentPattern> = Vec::new();
    for pattern in classified {
        match store::insert_pattern(transaction, db_path, &pattern, &timestamp) {
            Ok(()) => persisted.push(pattern),
            Err(error) => errors.push(format!(
                "source `{}`/`{}`: {}",
                pattern.document_type, pattern.source, error.message
            )),
        }
    }
    let patterns_detected = persisted
        .iter()
        .filter(|pattern| pattern.frequency != Frequency::Unknown)
        .count() as i64;

    let detections = detect_missing(&persisted, &uploads, as_of);
    let missing_detected = detections.len() as i64;

    sync_missing_records(transaction, db_path, &detections, &uploads, &timestamp)?;

    let deadlines_created =
        rebuild_deadlines(transaction, db_path, &timestamp)?;

    let outcome = AnalysisOutcome {
        run_id: run_id.clone(),
        patterns: persisted,
        total_sources,
        patterns_detected,
        missing_detected,
        deadlines_created,
        duration_ms: started.elapsed().as_millis() as i64,
        errors: errors.clone(),
    };

    store::record_analysis_run(
        transaction,
        db_path,
        &store::AnalysisRunRecord {
            run_id,
            started_at,
            duration_ms: outcome.duration_ms,
            total_sources,
            patterns_detected,
            missing_detected,
            errors,
        },
    )?;

    Ok(outcome)
}

/// Reconcile stored missing-document records against a fresh detection pass.
///
/// Fulfilled records close first: an upload on or after the expected date
/// marks the record uploaded even when the pattern already predicts the next
/// cycle. Surviving open records (at most one per pattern) are refreshed in
/// place with their status preserved, and new detections are inserted unless
/// a closed record already covers the same expected date (a dismissal must
/// stay dismissed).
fn sync_missing_records(
    transaction: &Transaction<'_>,
    db_path: &Path,
    detections: &[MissingDocument],
    uploads: &[UploadEvent],
    timestamp: &str,
) -> ClientResult<()> {
    let all_records = store::load_all_missing(transaction, db_path)?;

    let mut latest_upload_by_key: BTreeMap<String, NaiveDate> = BTreeMap::new();
    for upload in uploads {
        let entry = latest_upload_by_key
            .entry(upload.pattern_key())
            .or_insert(upload.uploaded_at);
        if upload.uploaded_at > *entry {
            *entry = upload.uploaded_at;
        }
    }

    let mut open_by_pattern: BTreeMap<String, &MissingDocument> = BTreeMap::new();
    let mut closed_keys: BTreeSet<(String, String)> = BTreeSet::new();
    for record in &all_records {
        if record.status.is_terminal() {
            closed_keys.insert((
                record.pattern_id.clone(),
                format_iso_date(&record.expected_date),
            ));
            continue;
        }

        let key = pattern_key(&record.document_type, &record.source);
        let fulfilled = latest_upload_by_key
            .get(&key)
            .map(|latest| *latest >= record.expected_date)
            .unwrap_or(false);
        if fulfilled {
            store::set_missing_status(
                transaction,
                db_path,
                &record.missing_id,
                MissingStatus::Uploaded,
                timestamp,
            )?;
            continue;
        }

        open_by_pattern.insert(record.pattern_id.clone(), record);
    }

    for detection in detections {
        match open_by_pattern.get(detection.pattern_id.as_str()) {
            Some(existing) => {
                store::refresh_missing_fields(
                    transaction,
                    db_path,
                    &existing.missing_id,
                    detection,
                    timestamp,
                )?;
            }
            None => {
                let closed_key = (
                    detection.pattern_id.clone(),
                    format_iso_date(&detection.expected_date),
                );
                if closed_keys.contains(&closed_key) {
                    continue;
                }
                store::insert_missing(transaction, db_path, detection, timestamp)?;
            }
        }
    }

    Ok(())
}

fn rebuild_deadlines(
    transaction: &Transaction<'_>,
    db_path: &Path,
    timestamp: &str,
) -> ClientResult<i64> {
    let open_records = store::load_open_missing(transaction, db_path)?;
    let deadlines: Vec<TaxDeadline> = open_records
        .iter()
        .filter_map(deadline_from_missing)
        .collect();
    store::replace_deadlines(transaction, db_path, &deadlines, timestamp)
}
