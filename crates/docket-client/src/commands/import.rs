use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::commands::common::resolve_as_of;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ImportListData, ImportRunRow, UploadImportData};
use crate::import;
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};

#[derive(Debug, Default)]
pub struct ImportRunOptions<'a> {
    pub path: Option<String>,
    pub dry_run: bool,
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

pub fn run(path: Option<String>, dry_run: bool) -> ClientResult<SuccessEnvelope> {
    run_with_options(ImportRunOptions {
        path,
        dry_run,
        as_of: None,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ImportRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "import create")?;

    let result = import::execute(
        &setup,
        options.path,
        options.dry_run,
        options.stdin_override,
        as_of,
    )?;

    let data = UploadImportData {
        dry_run: result.dry_run,
        import_id: result.import_id,
        message: result.message,
        summary: result.summary,
        source_used: result.source_used,
        refreshed: result.refreshed,
    };

    success("import", data)
}

#[derive(Debug, Default)]
pub struct ImportListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(ImportListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: ImportListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut statement = connection
        .prepare(
            "SELECT
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
             FROM internal_import_runs
             ORDER BY created_at DESC, import_id DESC",
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok(ImportRunRow {
                import_id: row.get(0)?,
                status: row.get(1)?,
                created_at: row.get(2)?,
                rows_read: row.get(3)?,
                rows_valid: row.get(4)?,
                rows_invalid: row.get(5)?,
                inserted: row.get(6)?,
                deduped: row.get(7)?,
                source_kind: row.get(8)?,
                source_ref: row.get(9)?,
            })
        })
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let mut rows: Vec<ImportRunRow> = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(&db_path, &error))?);
    }

    success("import list", ImportListData { rows })
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}
