use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::analysis::date::format_iso_date;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{DeadlineRow, DeadlinesData};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::store;

#[derive(Debug, Default)]
pub struct DeadlinesOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(DeadlinesOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: DeadlinesOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let rows = store::load_deadlines(&connection, &db_path)?
        .iter()
        .map(|deadline| DeadlineRow {
            deadline_id: deadline.deadline_id.clone(),
            missing_id: deadline.missing_document_id.clone(),
            pattern_id: deadline.pattern_id.clone(),
            deadline_type: deadline.deadline_type.clone(),
            title: deadline.title.clone(),
            due_date: format_iso_date(&deadline.due_date),
            document_type: deadline.document_type.clone(),
            source: deadline.source.clone(),
        })
        .collect::<Vec<DeadlineRow>>();

    success("deadlines", DeadlinesData { rows })
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}
