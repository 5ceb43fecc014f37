use std::collections::HashSet;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::ClientResult;
use crate::import::CanonicalUpload;
use crate::state::map_sqlite_error;

#[derive(Debug, Clone)]
pub(crate) struct DedupeResult {
    pub(crate) insertable: Vec<CanonicalUpload>,
    pub(crate) deduped: i64,
}

pub(crate) fn dedupe_key(row: &CanonicalUpload) -> String {
    format!(
        "{}|{}|{}|{}",
        row.document_type,
        row.source,
        row.uploaded_at,
        row.reference.as_deref().unwrap_or("")
    )
}

/// Drop exact duplicates within one import batch, keeping first occurrence.
pub(crate) fn dedupe_batch(rows: Vec<CanonicalUpload>) -> DedupeResult {
    let mut seen: HashSet<String> = HashSet::new();
    let mut insertable = Vec::new();
    let mut deduped = 0_i64;

    for row in rows {
        if seen.insert(dedupe_key(&row)) {
            insertable.push(row);
        } else {
            deduped += 1;
        }
    }

    DedupeResult { insertable, deduped }
}

/// Drop rows that already exist in the tracker with the same identity.
pub(crate) fn dedupe_against_existing(
    connection: &Connection,
    db_path: &Path,
    rows: Vec<CanonicalUpload>,
) -> ClientResult<DedupeResult> {
    let mut insertable = Vec::new();
    let mut deduped = 0_i64;

    for row in rows {
        let exists = connection
            .query_row(
                "SELECT 1 FROM internal_uploads
                 WHERE document_type = ?1
                   AND source = ?2
                   AND uploaded_at = ?3
                   AND COALESCE(reference, '') = ?4
                 LIMIT 1",
                params![
                    &row.document_type,
                    &row.source,
                    &row.uploaded_at,
                    row.reference.as_deref().unwrap_or(""),
                ],
                |_row| Ok(true),
            )
            .optional()
            .map_err(|error| map_sqlite_error(db_path, &error))?
            .unwrap_or(false);

        if exists {
            deduped += 1;
        } else {
            insertable.push(row);
        }
    }

    Ok(DedupeResult { insertable, deduped })
}

#[cfg(test)]
mod tests {
    use crate::import::CanonicalUpload;

    use super::dedupe_batch;

    fn upload(document_type: &str, source: &str, uploaded_at: &str) -> CanonicalUpload {
        CanonicalUpload {
            document_type: document_type.to_string(),
            source: source.to_string(),
            uploaded_at: uploaded_at.to_string(),
            reference: None,
            notes: None,
        }
    }

    #[test]
    fn exact_batch_duplicates_are_dropped() {
        let result = dedupe_batch(vec![
            upload("bank_statement", "CBA", "2026-01-15"),
            upload("bank_statement", "CBA", "2026-01-15"),
            upload("bank_statement", "CBA", "2026-02-15"),
        ]);
        assert_eq!(result.insertable.len(), 2);
        assert_eq!(result.deduped, 1);
    }

    #[test]
    fn reference_distinguishes_same_day_uploads() {
        let mut first = upload("receipt", "Officeworks", "2026-01-15");
        first.reference = Some("receipt-a.pdf".to_string());
        let mut second = upload("receipt", "Officeworks", "2026-01-15");
        second.reference = Some("receipt-b.pdf".to_string());

        let result = dedupe_batch(vec![first, second]);
        assert_eq!(result.insertable.len(), 2);
        assert_eq!(result.deduped, 0);
    }
}
