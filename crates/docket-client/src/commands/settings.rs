use std::path::{Path, PathBuf};

use crate::analysis::reminders::ReminderSettings;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{SettingsData, SettingsRow, SettingsUpdateData};
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::store;
use crate::{ClientError, ClientResult};

/// Partial update for one document type's reminder settings; unset fields
/// keep their stored (or default) values.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub reminder_days_before: Option<i64>,
    pub reminder_days_after: Option<i64>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub max_reminders: Option<i64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.reminder_days_before.is_none()
            && self.reminder_days_after.is_none()
            && self.email_notifications.is_none()
            && self.push_notifications.is_none()
            && self.max_reminders.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SettingsOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn show(document_type: Option<&str>) -> ClientResult<SuccessEnvelope> {
    show_with_options(document_type, SettingsOptions::default())
}

#[doc(hidden)]
pub fn show_with_options(
    document_type: Option<&str>,
    options: SettingsOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let rows = match document_type {
        Some(type_key) => {
            let settings = store::load_reminder_settings(&connection, &db_path, type_key)?
                .unwrap_or_else(|| ReminderSettings::default_for(type_key));
            vec![settings_row(&settings)]
        }
        None => store::load_all_reminder_settings(&connection, &db_path)?
            .iter()
            .map(settings_row)
            .collect(),
    };

    success("settings show", SettingsData { rows })
}

pub fn set(document_type: &str, patch: SettingsPatch) -> ClientResult<SuccessEnvelope> {
    set_with_options(document_type, patch, SettingsOptions::default())
}

#[doc(hidden)]
pub fn set_with_options(
    document_type: &str,
    patch: SettingsPatch,
    options: SettingsOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    if document_type.trim().is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "document type must be non-empty.",
            Some("settings set"),
        ));
    }
    if patch.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "Pass at least one setting flag to change.",
            Some("settings set"),
        ));
    }
    validate_patch(&patch)?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut settings = store::load_reminder_settings(&connection, &db_path, document_type)?
        .unwrap_or_else(|| ReminderSettings::default_for(document_type));

    if let Some(enabled) = patch.enabled {
        settings.enabled = enabled;
    }
    if let Some(days_before) = patch.reminder_days_before {
        settings.reminder_days_before = days_before;
    }
    if let Some(days_after) = patch.reminder_days_after {
        settings.reminder_days_after = days_after;
    }
    if let Some(email) = patch.email_notifications {
        settings.email_notifications = email;
    }
    if let Some(push) = patch.push_notifications {
        settings.push_notifications = push;
    }
    if let Some(max_reminders) = patch.max_reminders {
        settings.max_reminders = max_reminders;
    }

    store::upsert_reminder_settings(&connection, &db_path, &settings, &store::now_timestamp())?;

    success(
        "settings set",
        SettingsUpdateData {
            row: settings_row(&settings),
            message: format!("Reminder settings updated for `{document_type}`."),
        },
    )
}

fn validate_patch(patch: &SettingsPatch) -> ClientResult<()> {
    if let Some(days) = patch.reminder_days_before
        && days < 0
    {
        return Err(ClientError::invalid_argument_for_command(
            "`days-before` must be zero or positive.",
            Some("settings set"),
        ));
    }
    if let Some(days) = patch.reminder_days_after
        && days < 0
    {
        return Err(ClientError::invalid_argument_for_command(
            "`days-after` must be zero or positive.",
            Some("settings set"),
        ));
    }
    if let Some(max_reminders) = patch.max_reminders
        && max_reminders < 1
    {
        return Err(ClientError::invalid_argument_for_command(
            "`max-reminders` must be at least 1.",
            Some("settings set"),
        ));
    }
    Ok(())
}

fn settings_row(settings: &ReminderSettings) -> SettingsRow {
    SettingsRow {
        document_type: settings.document_type.clone(),
        enabled: settings.enabled,
        reminder_days_before: settings.reminder_days_before,
        reminder_days_after: settings.reminder_days_after,
        email_notifications: settings.email_notifications,
        push_notifications: settings.push_notifications,
        max_reminders: settings.max_reminders,
    }
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}
