use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Value, json};

use crate::analysis::calendar::TaxDeadline;
use crate::analysis::date::{format_iso_date, parse_upload_date};
use crate::analysis::missing::MissingDocument;
use crate::analysis::pattern::{DocumentPattern, PatternChange};
use crate::analysis::reminders::{DocumentReminder, ReminderSettings};
use crate::analysis::types::{Confidence, Frequency, MissingStatus, Stability};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct AnalysisRunRecord {
    pub run_id: String,
    pub started_at: String,
    pub duration_ms: i64,
    pub total_sources: i64,
    pub patterns_detected: i64,
    pub missing_detected: i64,
    pub errors: Vec<String>,
}

pub(crate) fn now_timestamp() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH);
    match now {
        Ok(duration) => format!("{}", duration.as_secs()),
        Err(_) => "0".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

pub fn load_patterns(connection: &Connection, db_path: &Path) -> ClientResult<Vec<DocumentPattern>> {
    let mut statement = connection
        .prepare(
            "SELECT
                pattern_id,
                document_type,
                source,
                frequency,
                stability,
                confidence,
                average_interval_days,
                stddev_interval_days,
                coefficient_of_variation,
                uploads_analyzed,
                last_upload_date,
                next_expected_date,
                pattern_changes
             FROM internal_patterns
             ORDER BY document_type ASC, source ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<f64>>(6)?,
                row.get::<_, Option<f64>>(7)?,
                row.get::<_, Option<f64>>(8)?,
                row.get::<_, i64>(9)?,
                row.get::<_, Option<String>>(10)?,
                row.get::<_, Option<String>>(11)?,
                row.get::<_, String>(12)?,
            ))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut patterns: Vec<DocumentPattern> = Vec::new();
    for row in rows_iter {
        let (
            pattern_id,
            document_type,
            source,
            frequency,
            stability,
            confidence,
            average_interval_days,
            stddev_interval_days,
            coefficient_of_variation,
            uploads_analyzed,
            last_upload_date,
            next_expected_date,
            pattern_changes,
        ) = row.map_err(|error| map_sqlite_error(db_path, &error))?;

        patterns.push(DocumentPattern {
            pattern_id,
            document_type,
            source,
            frequency: Frequency::parse(&frequency),
            stability: Stability::parse(&stability),
            confidence: Confidence::parse(&confidence),
            average_interval_days,
            stddev_interval_days,
            coefficient_of_variation,
            uploads_analyzed,
            last_upload_date: last_upload_date.as_deref().and_then(parse_upload_date),
            next_expected_date: next_expected_date.as_deref().and_then(parse_upload_date),
            pattern_changes: parse_pattern_changes(&pattern_changes),
        });
    }

    Ok(patterns)
}

pub fn delete_all_patterns(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    connection
        .execute("DELETE FROM internal_patterns", [])
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn insert_pattern(
    connection: &Connection,
    db_path: &Path,
    pattern: &DocumentPattern,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "INSERT INTO internal_patterns (
                pattern_id,
                document_type,
                source,
                frequency,
                stability,
                confidence,
                average_interval_days,
                stddev_interval_days,
                coefficient_of_variation,
                uploads_analyzed,
                last_upload_date,
                next_expected_date,
                pattern_changes,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                &pattern.pattern_id,
                &pattern.document_type,
                &pattern.source,
                pattern.frequency.as_str(),
                pattern.stability.as_str(),
                pattern.confidence.as_str(),
                pattern.average_interval_days,
                pattern.stddev_interval_days,
                pattern.coefficient_of_variation,
                pattern.uploads_analyzed,
                pattern.last_upload_date.as_ref().map(format_iso_date),
                pattern.next_expected_date.as_ref().map(format_iso_date),
                render_pattern_changes(&pattern.pattern_changes),
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn delete_pattern(
    connection: &Connection,
    db_path: &Path,
    pattern_id: &str,
) -> ClientResult<bool> {
    let deleted = connection
        .execute(
            "DELETE FROM internal_patterns WHERE pattern_id = ?1",
            [pattern_id],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(deleted > 0)
}

fn render_pattern_changes(changes: &[PatternChange]) -> String {
    let entries: Vec<Value> = changes
        .iter()
        .map(|change| {
            json!({
                "changed_at": format_iso_date(&change.changed_at),
                "field": change.field,
                "from": change.from,
                "to": change.to,
            })
        })
        .collect();
    Value::Array(entries).to_string()
}

fn parse_pattern_changes(raw: &str) -> Vec<PatternChange> {
    let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    let Some(entries) = parsed.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let changed_at = entry
                .get("changed_at")
                .and_then(Value::as_str)
                .and_then(parse_upload_date)?;
            Some(PatternChange {
                changed_at,
                field: entry.get("field").and_then(Value::as_str)?.to_string(),
                from: entry.get("from").and_then(Value::as_str)?.to_string(),
                to: entry.get("to").and_then(Value::as_str)?.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Missing documents
// ---------------------------------------------------------------------------

pub fn load_open_missing(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<Vec<MissingDocument>> {
    load_missing_where(connection, db_path, "status IN ('pending', 'reminded')")
}

pub fn load_all_missing(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<Vec<MissingDocument>> {
    load_missing_where(connection, db_path, "1 = 1")
}

fn load_missing_where(
    connection: &Connection,
    db_path: &Path,
    predicate: &str,
) -> ClientResult<Vec<MissingDocument>> {
    let sql = format!(
        "SELECT
            missing_id,
            pattern_id,
            document_type,
            source,
            expected_date,
            grace_period_end,
            days_overdue,
            is_missing,
            confidence,
            historical_uploads,
            last_upload_date,
            status
         FROM internal_missing_documents
         WHERE {predicate}
         ORDER BY expected_date ASC, document_type ASC, source ASC, missing_id ASC"
    );
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, i64>(9)?,
                row.get::<_, Option<String>>(10)?,
                row.get::<_, String>(11)?,
            ))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut records: Vec<MissingDocument> = Vec::new();
    for row in rows_iter {
        let (
            missing_id,
            pattern_id,
            document_type,
            source,
            expected_date,
            grace_period_end,
            days_overdue,
            is_missing,
            confidence,
            historical_uploads,
            last_upload_date,
            status,
        ) = row.map_err(|error| map_sqlite_error(db_path, &error))?;

        let Some(expected) = parse_upload_date(&expected_date) else {
            continue;
        };
        let Some(grace_end) = parse_upload_date(&grace_period_end) else {
            continue;
        };
        let Some(parsed_status) = MissingStatus::parse(&status) else {
            continue;
        };

        records.push(MissingDocument {
            missing_id,
            pattern_id,
            document_type,
            source,
            expected_date: expected,
            grace_period_end: grace_end,
            days_overdue,
            is_missing: is_missing != 0,
            confidence: Confidence::parse(&confidence),
            historical_uploads,
            last_upload_date: last_upload_date.as_deref().and_then(parse_upload_date),
            status: parsed_status,
        });
    }

    Ok(records)
}

pub fn insert_missing(
    connection: &Connection,
    db_path: &Path,
    record: &MissingDocument,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "INSERT INTO internal_missing_documents (
                missing_id,
                pattern_id,
                document_type,
                source,
                expected_date,
                grace_period_end,
                days_overdue,
                is_missing,
                confidence,
                historical_uploads,
                last_upload_date,
                status,
                detected_at,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                &record.missing_id,
                &record.pattern_id,
                &record.document_type,
                &record.source,
                format_iso_date(&record.expected_date),
                format_iso_date(&record.grace_period_end),
                record.days_overdue,
                if record.is_missing { 1_i64 } else { 0_i64 },
                record.confidence.as_str(),
                record.historical_uploads,
                record.last_upload_date.as_ref().map(format_iso_date),
                record.status.as_str(),
                timestamp,
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn refresh_missing_fields(
    connection: &Connection,
    db_path: &Path,
    missing_id: &str,
    detection: &MissingDocument,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "UPDATE internal_missing_documents SET
                expected_date = ?2,
                grace_period_end = ?3,
                days_overdue = ?4,
                is_missing = ?5,
                confidence = ?6,
                historical_uploads = ?7,
                last_upload_date = ?8,
                updated_at = ?9
             WHERE missing_id = ?1",
            params![
                missing_id,
                format_iso_date(&detection.expected_date),
                format_iso_date(&detection.grace_period_end),
                detection.days_overdue,
                if detection.is_missing { 1_i64 } else { 0_i64 },
                detection.confidence.as_str(),
                detection.historical_uploads,
                detection.last_upload_date.as_ref().map(format_iso_date),
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub(crate) fn set_missing_status(
    connection: &Connection,
    db_path: &Path,
    missing_id: &str,
    status: MissingStatus,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "UPDATE internal_missing_documents
             SET status = ?2, updated_at = ?3
             WHERE missing_id = ?1",
            params![missing_id, status.as_str(), timestamp],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

/// Status transition with terminal-state enforcement: uploaded and
/// dismissed records refuse further changes.
pub fn update_missing_status(
    connection: &Connection,
    db_path: &Path,
    missing_id: &str,
    status: MissingStatus,
) -> ClientResult<()> {
    let current = connection
        .query_row(
            "SELECT status FROM internal_missing_documents WHERE missing_id = ?1 LIMIT 1",
            [missing_id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let Some(current_status) = current else {
        return Err(ClientError::missing_document_not_found(missing_id));
    };

    if let Some(parsed) = MissingStatus::parse(&current_status)
        && parsed.is_terminal()
    {
        return Err(ClientError::missing_document_already_closed(
            missing_id,
            parsed.as_str(),
        ));
    }

    set_missing_status(connection, db_path, missing_id, status, &now_timestamp())
}

// ---------------------------------------------------------------------------
// Reminder settings and bookkeeping
// ---------------------------------------------------------------------------

pub fn load_reminder_settings(
    connection: &Connection,
    db_path: &Path,
    document_type: &str,
) -> ClientResult<Option<ReminderSettings>> {
    let row = connection
        .query_row(
            "SELECT
                document_type,
                enabled,
                reminder_days_before,
                reminder_days_after,
                email_notifications,
                push_notifications,
                max_reminders
             FROM internal_reminder_settings
             WHERE document_type = ?1
             LIMIT 1",
            [document_type],
            map_settings_row,
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(row)
}

pub fn load_all_reminder_settings(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<Vec<ReminderSettings>> {
    let mut statement = connection
        .prepare(
            "SELECT
                document_type,
                enabled,
                reminder_days_before,
                reminder_days_after,
                email_notifications,
                push_notifications,
                max_reminders
             FROM internal_reminder_settings
             ORDER BY document_type ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], map_settings_row)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows: Vec<ReminderSettings> = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(rows)
}

pub fn settings_by_type(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<BTreeMap<String, ReminderSettings>> {
    let mut map = BTreeMap::new();
    for settings in load_all_reminder_settings(connection, db_path)? {
        map.insert(settings.document_type.clone(), settings);
    }
    Ok(map)
}

fn map_settings_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReminderSettings> {
    Ok(ReminderSettings {
        document_type: row.get(0)?,
        enabled: row.get::<_, i64>(1)? != 0,
        reminder_days_before: row.get(2)?,
        reminder_days_after: row.get(3)?,
        email_notifications: row.get::<_, i64>(4)? != 0,
        push_notifications: row.get::<_, i64>(5)? != 0,
        max_reminders: row.get(6)?,
    })
}

pub fn upsert_reminder_settings(
    connection: &Connection,
    db_path: &Path,
    settings: &ReminderSettings,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "INSERT INTO internal_reminder_settings (
                document_type,
                enabled,
                reminder_days_before,
                reminder_days_after,
                email_notifications,
                push_notifications,
                max_reminders,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (document_type) DO UPDATE SET
                enabled = excluded.enabled,
                reminder_days_before = excluded.reminder_days_before,
                reminder_days_after = excluded.reminder_days_after,
                email_notifications = excluded.email_notifications,
                push_notifications = excluded.push_notifications,
                max_reminders = excluded.max_reminders,
                updated_at = excluded.updated_at",
            params![
                &settings.document_type,
                if settings.enabled { 1_i64 } else { 0_i64 },
                settings.reminder_days_before,
                settings.reminder_days_after,
                if settings.email_notifications { 1_i64 } else { 0_i64 },
                if settings.push_notifications { 1_i64 } else { 0_i64 },
                settings.max_reminders,
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn reminder_count(
    connection: &Connection,
    db_path: &Path,
    missing_id: &str,
) -> ClientResult<i64> {
    // One reminder may land on several channels; count reminders, not rows.
    connection
        .query_row(
            "SELECT COUNT(DISTINCT reminder_id) FROM internal_reminder_log WHERE missing_id = ?1",
            [missing_id],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub fn reminder_counts_by_missing_id(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<BTreeMap<String, i64>> {
    let mut statement = connection
        .prepare(
            "SELECT missing_id, COUNT(DISTINCT reminder_id)
             FROM internal_reminder_log
             GROUP BY missing_id",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows_iter {
        let (missing_id, count) = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        counts.insert(missing_id, count);
    }
    Ok(counts)
}

pub fn record_reminder_sent(
    connection: &Connection,
    db_path: &Path,
    reminder: &DocumentReminder,
    channel: &str,
    timestamp: &str,
) -> ClientResult<()> {
    connection
        .execute(
            "INSERT INTO internal_reminder_log (
                reminder_id,
                missing_id,
                reminder_type,
                urgency,
                channel,
                sent_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &reminder.id,
                &reminder.missing_id,
                reminder.reminder_type.as_str(),
                reminder.urgency.as_str(),
                channel,
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Analysis runs and tax deadlines
// ---------------------------------------------------------------------------

pub fn record_analysis_run(
    connection: &Connection,
    db_path: &Path,
    run: &AnalysisRunRecord,
) -> ClientResult<()> {
    let errors = Value::Array(
        run.errors
            .iter()
            .map(|error| Value::String(error.clone()))
            .collect(),
    );
    connection
        .execute(
            "INSERT INTO internal_analysis_runs (
                run_id,
                started_at,
                duration_ms,
                total_sources,
                patterns_detected,
                missing_detected,
                errors
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &run.run_id,
                &run.started_at,
                run.duration_ms,
                run.total_sources,
                run.patterns_detected,
                run.missing_detected,
                errors.to_string(),
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}

pub fn replace_deadlines(
    connection: &Connection,
    db_path: &Path,
    deadlines: &[TaxDeadline],
    timestamp: &str,
) -> ClientResult<i64> {
    connection
        .execute("DELETE FROM internal_tax_deadlines", [])
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut inserted = 0_i64;
    for deadline in deadlines {
        connection
            .execute(
                "INSERT INTO internal_tax_deadlines (
                    deadline_id,
                    missing_id,
                    pattern_id,
                    deadline_type,
                    title,
                    due_date,
                    document_type,
                    source,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &deadline.deadline_id,
                    &deadline.missing_document_id,
                    &deadline.pattern_id,
                    &deadline.deadline_type,
                    &deadline.title,
                    format_iso_date(&deadline.due_date),
                    &deadline.document_type,
                    &deadline.source,
                    timestamp,
                ],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;
        inserted += 1;
    }
    Ok(inserted)
}

pub fn load_deadlines(connection: &Connection, db_path: &Path) -> ClientResult<Vec<TaxDeadline>> {
    let mut statement = connection
        .prepare(
            "SELECT
                deadline_id,
                missing_id,
                pattern_id,
                deadline_type,
                title,
                due_date,
                document_type,
                source
             FROM internal_tax_deadlines
             ORDER BY due_date ASC, document_type ASC, source ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut deadlines: Vec<TaxDeadline> = Vec::new();
    for row in rows_iter {
        let (
            deadline_id,
            missing_id,
            pattern_id,
            deadline_type,
            title,
            due_date,
            document_type,
            source,
        ) = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        let Some(due) = parse_upload_date(&due_date) else {
            continue;
        };
        deadlines.push(TaxDeadline {
            deadline_id,
            missing_document_id: missing_id,
            pattern_id,
            deadline_type,
            title,
            due_date: due,
            document_type,
            source,
            is_upload_reminder: true,
        });
    }
    Ok(deadlines)
}

/// Recompute overdue state for a stored record at display time, keeping the
/// `is_missing == (as_of > grace_period_end)` invariant true on read.
pub fn reproject_missing(record: &MissingDocument, as_of: NaiveDate) -> MissingDocument {
    let mut projected = record.clone();
    if as_of > record.grace_period_end {
        projected.is_missing = true;
        projected.days_overdue = (as_of - record.grace_period_end).num_days();
    } else {
        projected.is_missing = false;
        projected.days_overdue = 0;
    }
    projected
}
