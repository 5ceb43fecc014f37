use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::analysis::date::format_iso_date;
use crate::analysis::policy::PATTERN_POLICY_VERSION;
use crate::analysis::process::process_due_reminders;
use crate::analysis::reminders::{
    DocumentReminder, GenerateOptions, ReminderGeneration, generate_reminders,
};
use crate::commands::common::resolve_as_of;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    ProcessData, ReminderRow, RemindersByType, RemindersByUrgency, RemindersData,
};
use crate::notify::{Notifier, NullNotifier};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::store;

#[derive(Debug, Default)]
pub struct RemindersListOptions<'a> {
    pub as_of: Option<String>,
    pub ignore_settings: bool,
    pub home_override: Option<&'a Path>,
}

pub struct RemindersProcessOptions<'a> {
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
    pub notifier: Option<&'a dyn Notifier>,
}

impl Default for RemindersProcessOptions<'_> {
    fn default() -> Self {
        Self {
            as_of: None,
            home_override: None,
            notifier: None,
        }
    }
}

pub fn list(as_of: Option<&str>, ignore_settings: bool) -> ClientResult<SuccessEnvelope> {
    list_with_options(RemindersListOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        ignore_settings,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: RemindersListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "reminders list")?;

    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let generation = generate_for(&connection, &db_path, as_of, options.ignore_settings)?;

    let data = RemindersData {
        policy_version: PATTERN_POLICY_VERSION.to_string(),
        as_of: format_iso_date(&as_of),
        total_pending: generation.total_pending,
        total_reminders: generation.total_reminders,
        by_type: RemindersByType {
            upcoming: generation.by_type.upcoming,
            overdue: generation.by_type.overdue,
            follow_up: generation.by_type.follow_up,
            final_notice: generation.by_type.final_notice,
        },
        by_urgency: RemindersByUrgency {
            low: generation.by_urgency.low,
            medium: generation.by_urgency.medium,
            high: generation.by_urgency.high,
            critical: generation.by_urgency.critical,
        },
        rows: generation
            .reminders
            .iter()
            .map(reminder_row)
            .collect::<Vec<ReminderRow>>(),
        warnings: generation.warnings,
    };

    success("reminders", data)
}

pub fn process(as_of: Option<&str>) -> ClientResult<SuccessEnvelope> {
    process_with_options(RemindersProcessOptions {
        as_of: as_of.map(std::string::ToString::to_string),
        home_override: None,
        notifier: None,
    })
}

#[doc(hidden)]
pub fn process_with_options(options: RemindersProcessOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let as_of = resolve_as_of(options.as_of.as_deref(), "reminders process")?;

    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;
    let generation = generate_for(&connection, &db_path, as_of, false)?;
    let settings = store::settings_by_type(&connection, &db_path)?;

    let fallback = NullNotifier;
    let notifier: &dyn Notifier = options.notifier.unwrap_or(&fallback);

    let summary = process_due_reminders(
        &connection,
        &db_path,
        &generation.reminders,
        &settings,
        notifier,
        as_of,
    )?;

    let data = ProcessData {
        as_of: format_iso_date(&as_of),
        processed: summary.processed,
        sent: summary.sent,
        failed: summary.failed,
        errors: summary.errors,
    };

    success("reminders process", data)
}

fn generate_for(
    connection: &rusqlite::Connection,
    db_path: &Path,
    as_of: chrono::NaiveDate,
    ignore_settings: bool,
) -> ClientResult<ReminderGeneration> {
    let records = store::load_open_missing(connection, db_path)?
        .iter()
        .map(|record| store::reproject_missing(record, as_of))
        .collect::<Vec<_>>();
    let settings = store::settings_by_type(connection, db_path)?;
    let sent_counts = store::reminder_counts_by_missing_id(connection, db_path)?;

    Ok(generate_reminders(
        &records,
        &settings,
        &sent_counts,
        GenerateOptions {
            respect_settings: !ignore_settings,
        },
    ))
}

fn reminder_row(reminder: &DocumentReminder) -> ReminderRow {
    ReminderRow {
        id: reminder.id.clone(),
        missing_id: reminder.missing_id.clone(),
        document_type: reminder.document_type.clone(),
        source: reminder.source.clone(),
        reminder_type: reminder.reminder_type.as_str().to_string(),
        urgency: reminder.urgency.as_str().to_string(),
        title: reminder.message.title.clone(),
        body: reminder.message.body.clone(),
        details: reminder.message.details.clone(),
        actions: reminder
            .actions
            .iter()
            .map(|action| action.as_str().to_string())
            .collect(),
        scheduled_for: format_iso_date(&reminder.scheduled_for),
    }
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}
