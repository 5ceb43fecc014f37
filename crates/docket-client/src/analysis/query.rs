use std::path::Path;

use rusqlite::{Connection, params};

use crate::ClientResult;
use crate::analysis::date::{format_iso_date, parse_upload_date};
use crate::analysis::types::{AnalysisFilter, UploadEvent};
use crate::state::map_sqlite_error;

pub fn load_uploads(
    connection: &Connection,
    db_path: &Path,
    filter: &AnalysisFilter,
) -> ClientResult<Vec<UploadEvent>> {
    let mut statement = connection
        .prepare(
            "SELECT
                upload_id,
                document_type,
                source,
                uploaded_at
             FROM internal_uploads
             WHERE (?1 IS NULL OR uploaded_at >= ?1)
               AND (?2 IS NULL OR uploaded_at <= ?2)
             ORDER BY document_type ASC, source ASC, uploaded_at ASC, upload_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let from_bound = filter.from.as_ref().map(format_iso_date);
    let to_bound = filter.to.as_ref().map(format_iso_date);

    let rows_iter = statement
        .query_map(params![from_bound, to_bound], |row| {
            let upload_id: String = row.get(0)?;
            let document_type: String = row.get(1)?;
            let source: String = row.get(2)?;
            let uploaded_at: String = row.get(3)?;
            Ok((upload_id, document_type, source, uploaded_at))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut uploads: Vec<UploadEvent> = Vec::new();
    for row in rows_iter {
        let (upload_id, document_type, source, uploaded_at) =
            row.map_err(|error| map_sqlite_error(db_path, &error))?;
        let Some(parsed_date) = parse_upload_date(&uploaded_at) else {
            continue;
        };

        uploads.push(UploadEvent {
            upload_id,
            document_type: document_type.trim().to_string(),
            source: source.trim().to_string(),
            uploaded_at: parsed_date,
        });
    }

    Ok(uploads)
}
