use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::ClientResult;
use crate::analysis::reminders::{DocumentReminder, ReminderSettings};
use crate::analysis::types::MissingStatus;
use crate::notify::{Channel, Notifier};
use crate::store;

#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub processed: i64,
    pub sent: i64,
    pub failed: i64,
    pub errors: Vec<String>,
}

/// Deliver every reminder that is due as of `as_of`.
///
/// Delivery itself is the notifier's problem; this only picks channels from
/// the per-type settings, tracks counts, logs successful sends, and flips
/// the originating record to reminded. A reminder counts as sent when at
/// least one channel accepts it.
pub fn process_due_reminders(
    connection: &Connection,
    db_path: &Path,
    reminders: &[DocumentReminder],
    settings: &BTreeMap<String, ReminderSettings>,
    notifier: &dyn Notifier,
    as_of: NaiveDate,
) -> ClientResult<ProcessSummary> {
    let timestamp = store::now_timestamp();
    let mut summary = ProcessSummary {
        processed: 0,
        sent: 0,
        failed: 0,
        errors: Vec::new(),
    };

    for reminder in reminders {
        if reminder.scheduled_for > as_of {
            continue;
        }
        summary.processed += 1;

        let type_settings = settings
            .get(&reminder.document_type)
            .cloned()
            .unwrap_or_else(|| ReminderSettings::default_for(&reminder.document_type));

        let mut channels: Vec<Channel> = Vec::new();
        if type_settings.email_notifications {
            channels.push(Channel::Email);
        }
        if type_settings.push_notifications {
            channels.push(Channel::Push);
        }

        if channels.is_empty() {
            // Nothing to deliver on; the reminder stays eligible.
            continue;
        }

        let mut delivered = false;
        let mut channel_errors: Vec<String> = Vec::new();
        for channel in channels {
            match notifier.deliver(reminder, channel) {
                Ok(()) => {
                    store::record_reminder_sent(
                        connection,
                        db_path,
                        reminder,
                        channel.as_str(),
                        &timestamp,
                    )?;
                    delivered = true;
                }
                Err(reason) => {
                    channel_errors.push(format!("{}: {reason}", channel.as_str()));
                }
            }
        }

        if delivered {
            summary.sent += 1;
            store::set_missing_status(
                connection,
                db_path,
                &reminder.missing_id,
                MissingStatus::Reminded,
                &timestamp,
            )?;
        } else {
            summary.failed += 1;
            summary.errors.push(format!(
                "reminder `{}` for `{}`: {}",
                reminder.id,
                reminder.source,
                channel_errors.join("; ")
            ));
        }
    }

    Ok(summary)
}
