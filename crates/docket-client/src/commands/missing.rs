use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::analysis::date::format_iso_date;
use crate::analysis::missing::MissingDocument;
use crate::analysis::policy::PATTERN_POLICY_VERSION;
use crate::analysis::types::MissingStatus;
use crate::commands::common::resolve_as_of;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{MissingActionData, MissingData, MissingRow};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::store;

#[derive(Debug, Default)]
pub struct MissingListOptions<'a> {
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct MissingActionOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn list(as_of: Option<&str>) -> ClientResult<SuccessEnvelope> {
    list_with_options(MissingListOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: MissingListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "missing list")?;

    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let records = store::load_open_missing(&connection, &db_path)?;

    let rows = records
        .iter()
        .map(|record| missing_row(&store::reproject_missing(record, as_of)))
        .collect::<Vec<MissingRow>>();

    let data = MissingData {
        policy_version: PATTERN_POLICY_VERSION.to_string(),
        as_of: format_iso_date(&as_of),
        rows,
    };

    success("missing list", data)
}

pub fn dismiss(missing_id: &str) -> ClientResult<SuccessEnvelope> {
    dismiss_with_options(missing_id, MissingActionOptions::default())
}

#[doc(hidden)]
pub fn dismiss_with_options(
    missing_id: &str,
    options: MissingActionOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    transition(missing_id, MissingStatus::Dismissed, options)
}

pub fn mark_uploaded(missing_id: &str) -> ClientResult<SuccessEnvelope> {
    mark_uploaded_with_options(missing_id, MissingActionOptions::default())
}

#[doc(hidden)]
pub fn mark_uploaded_with_options(
    missing_id: &str,
    options: MissingActionOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    transition(missing_id, MissingStatus::Uploaded, options)
}

fn transition(
    missing_id: &str,
    status: MissingStatus,
    options: MissingActionOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    store::update_missing_status(&connection, &db_path, missing_id, status)?;

    let message = match status {
        MissingStatus::Dismissed => "Record dismissed; no further reminders will be generated.",
        MissingStatus::Uploaded => "Record marked uploaded; no further reminders will be generated.",
        MissingStatus::Pending | MissingStatus::Reminded => "Record status updated.",
    };

    let command = match status {
        MissingStatus::Dismissed => "missing dismiss",
        _ => "missing uploaded",
    };

    success(
        command,
        MissingActionData {
            missing_id: missing_id.to_string(),
            status: status.as_str().to_string(),
            message: message.to_string(),
        },
    )
}

pub(crate) fn missing_row(record: &MissingDocument) -> MissingRow {
    MissingRow {
        missing_id: record.missing_id.clone(),
        pattern_id: record.pattern_id.clone(),
        document_type: record.document_type.clone(),
        source: record.source.clone(),
        expected_date: format_iso_date(&record.expected_date),
        grace_period_end: format_iso_date(&record.grace_period_end),
        days_overdue: record.days_overdue,
        is_missing: record.is_missing,
        confidence: record.confidence.as_str().to_string(),
        historical_uploads: record.historical_uploads,
        last_upload_date: record.last_upload_date.as_ref().map(format_iso_date),
        status: record.status.as_str().to_string(),
    }
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}
