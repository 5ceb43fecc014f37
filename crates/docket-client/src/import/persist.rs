use std::path::Path;

use rusqlite::{Transaction, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::import::CanonicalUpload;
use crate::state::map_sqlite_error;
use crate::store::now_timestamp;

#[derive(Debug, Clone)]
pub(crate) struct PersistResult {
    pub(crate) import_id: String,
    pub(crate) inserted: i64,
}

pub(crate) struct PersistInput<'a> {
    pub(crate) rows: &'a [CanonicalUpload],
    pub(crate) rows_read: i64,
    pub(crate) rows_valid: i64,
    pub(crate) rows_invalid: i64,
    pub(crate) deduped: i64,
    pub(crate) source_kind: &'a str,
    pub(crate) source_ref: Option<&'a str>,
}

pub(crate) fn persist_import(
    transaction: &Transaction<'_>,
    db_path: &Path,
    input: PersistInput<'_>,
) -> ClientResult<PersistResult> {
    let import_id = format!("imp_{}", Ulid::new());
    let timestamp = now_timestamp();

    let mut inserted = 0_i64;
    for row in input.rows {
        insert_upload(transaction, db_path, &import_id, row, &timestamp)?;
        inserted += 1;
    }

    transaction
        .execute(
            "INSERT INTO internal_import_runs (
                import_id,
                status,
                created_at,
                rows_read,
                rows_valid,
                rows_invalid,
                inserted,
                deduped,
                source_kind,
                source_ref
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &import_id,
                "committed",
                &timestamp,
                input.rows_read,
                input.rows_valid,
                input.rows_invalid,
                inserted,
                input.deduped,
                input.source_kind,
                input.source_ref,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(PersistResult { import_id, inserted })
}

fn insert_upload(
    transaction: &Transaction<'_>,
    db_path: &Path,
    import_id: &str,
    row: &CanonicalUpload,
    timestamp: &str,
) -> ClientResult<()> {
    let upload_id = format!("upl_{}", Ulid::new());
    transaction
        .execute(
            "INSERT INTO internal_uploads (
                upload_id,
                import_id,
                document_type,
                source,
                uploaded_at,
                reference,
                notes,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &upload_id,
                import_id,
                &row.document_type,
                &row.source,
                &row.uploaded_at,
                &row.reference,
                &row.notes,
                timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(())
}
