use std::collections::BTreeMap;

use chrono::NaiveDate;
use ulid::Ulid;

use crate::analysis::date::format_iso_date;
use crate::analysis::missing::MissingDocument;
use crate::analysis::policy::{PATTERN_POLICY_V1, PatternPolicy};
use crate::analysis::schedule::{calculate_next_reminder_date, reminder_schedule};
use crate::analysis::types::{ReminderType, Urgency, document_type_label};

/// Per-document-type reminder preferences.
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub document_type: String,
    pub enabled: bool,
    pub reminder_days_before: i64,
    pub reminder_days_after: i64,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub max_reminders: i64,
}

impl ReminderSettings {
    /// Safe defaults derived from the type's schedule table: enabled, email
    /// on, push off, caps matching the schedule.
    pub fn default_for(document_type: &str) -> Self {
        let schedule = reminder_schedule(document_type);
        Self {
            document_type: document_type.to_string(),
            enabled: true,
            reminder_days_before: schedule.before_due.first().copied().unwrap_or(7),
            reminder_days_after: schedule.after_due.first().copied().unwrap_or(7),
            email_notifications: true,
            push_notifications: false,
            max_reminders: schedule.max_reminders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReminderAction {
    Upload,
    Dismiss,
    Snooze,
    ContactSupport,
}

impl ReminderAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Dismiss => "dismiss",
            Self::Snooze => "snooze",
            Self::ContactSupport => "contact_support",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderMessage {
    pub title: String,
    pub body: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentReminder {
    pub id: String,
    pub missing_id: String,
    pub document_type: String,
    pub source: String,
    pub reminder_type: ReminderType,
    pub urgency: Urgency,
    pub message: ReminderMessage,
    pub actions: Vec<ReminderAction>,
    pub scheduled_for: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub respect_settings: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            respect_settings: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub upcoming: i64,
    pub overdue: i64,
    pub follow_up: i64,
    pub final_notice: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrgencyCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

#[derive(Debug, Clone)]
pub struct ReminderGeneration {
    pub reminders: Vec<DocumentReminder>,
    pub total_pending: i64,
    pub total_reminders: i64,
    pub by_type: TypeCounts,
    pub by_urgency: UrgencyCounts,
    pub warnings: Vec<String>,
}

/// Generate a reminder batch from the current missing documents.
///
/// `settings` holds the stored per-type preferences; an absent type falls
/// back to safe defaults and surfaces a warning instead of failing.
/// `sent_counts` is the externally tracked reminders-sent tally per record.
pub fn generate_reminders(
    missing: &[MissingDocument],
    settings: &BTreeMap<String, ReminderSettings>,
    sent_counts: &BTreeMap<String, i64>,
    options: GenerateOptions,
) -> ReminderGeneration {
    generate_reminders_with_policy(missing, settings, sent_counts, options, PATTERN_POLICY_V1)
}

pub fn generate_reminders_with_policy(
    missing: &[MissingDocument],
    settings: &BTreeMap<String, ReminderSettings>,
    sent_counts: &BTreeMap<String, i64>,
    options: GenerateOptions,
    policy: PatternPolicy,
) -> ReminderGeneration {
    let mut reminders: Vec<DocumentReminder> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut warned_types: Vec<String> = Vec::new();
    let mut total_pending = 0_i64;

    for record in missing {
        if record.status.is_terminal() {
            continue;
        }
        total_pending += 1;

        let type_settings = match settings.get(&record.document_type) {
            Some(found) => found.clone(),
            None => {
                if !warned_types.contains(&record.document_type) {
                    warnings.push(format!(
                        "No reminder settings stored for `{}`; using defaults.",
                        record.document_type
                    ));
                    warned_types.push(record.document_type.clone());
                }
                ReminderSettings::default_for(&record.document_type)
            }
        };

        if options.respect_settings && !type_settings.enabled {
            continue;
        }

        let sent = sent_counts.get(&record.missing_id).copied().unwrap_or(0);
        if sent >= type_settings.max_reminders {
            continue;
        }

        // Schedule exhaustion is a terminal state, not an error.
        let Some(scheduled_for) = calculate_next_reminder_date(record, sent) else {
            continue;
        };

        let (reminder_type, urgency) = classify(record, policy);
        reminders.push(DocumentReminder {
            id: format!("rem_{}", Ulid::new()),
            missing_id: record.missing_id.clone(),
            document_type: record.document_type.clone(),
            source: record.source.clone(),
            reminder_type,
            urgency,
            message: compose_message(record, reminder_type),
            actions: actions_for(reminder_type),
            scheduled_for,
        });
    }

    let mut by_type = TypeCounts::default();
    let mut by_urgency = UrgencyCounts::default();
    for reminder in &reminders {
        match reminder.reminder_type {
            ReminderType::Upcoming => by_type.upcoming += 1,
            ReminderType::Overdue => by_type.overdue += 1,
            ReminderType::FollowUp => by_type.follow_up += 1,
            ReminderType::FinalNotice => by_type.final_notice += 1,
        }
        match reminder.urgency {
            Urgency::Low => by_urgency.low += 1,
            Urgency::Medium => by_urgency.medium += 1,
            Urgency::High => by_urgency.high += 1,
            Urgency::Critical => by_urgency.critical += 1,
        }
    }

    ReminderGeneration {
        total_reminders: reminders.len() as i64,
        reminders,
        total_pending,
        by_type,
        by_urgency,
        warnings,
    }
}

fn classify(record: &MissingDocument, policy: PatternPolicy) -> (ReminderType, Urgency) {
    if !record.is_missing {
        return (ReminderType::Upcoming, Urgency::Low);
    }
    if record.days_overdue <= policy.overdue_threshold_days {
        return (ReminderType::Overdue, Urgency::High);
    }
    if record.days_overdue <= policy.follow_up_threshold_days {
        return (ReminderType::FollowUp, Urgency::High);
    }
    (ReminderType::FinalNotice, Urgency::Critical)
}

fn compose_message(record: &MissingDocument, reminder_type: ReminderType) -> ReminderMessage {
    let label = document_type_label(&record.document_type);
    let source = record.source.as_str();
    let expected = format_iso_date(&record.expected_date);
    let days = record.days_overdue;

    match reminder_type {
        ReminderType::Upcoming => ReminderMessage {
            title: format!("Upcoming: {label} from {source}"),
            body: format!(
                "Your {label} from {source} is expected by {expected}. \
                 Upload it when it arrives to keep your records current."
            ),
            details: None,
        },
        ReminderType::Overdue => ReminderMessage {
            title: format!("Overdue: {label} from {source}"),
            body: format!(
                "Your {label} from {source} was expected on {expected} and is \
                 now {days} days overdue. Upload it to keep your tax records complete."
            ),
            details: Some(format!(
                "Expected {expected}; grace period ended {}.",
                format_iso_date(&record.grace_period_end)
            )),
        },
        ReminderType::FollowUp => ReminderMessage {
            title: format!("Still missing: {label} from {source}"),
            body: format!(
                "Your {label} from {source} has not been uploaded and is {days} \
                 days overdue. Check whether {source} has issued it yet."
            ),
            details: Some(format!(
                "Expected {expected}; grace period ended {}.",
                format_iso_date(&record.grace_period_end)
            )),
        },
        ReminderType::FinalNotice => ReminderMessage {
            title: format!("Final Notice: {label} from {source}"),
            body: format!(
                "Your {label} from {source} is significantly overdue: {days} days \
                 past its grace period. This is the last reminder for this document; \
                 upload it or dismiss the record."
            ),
            details: Some(format!(
                "Expected {expected}; grace period ended {}.",
                format_iso_date(&record.grace_period_end)
            )),
        },
    }
}

fn actions_for(reminder_type: ReminderType) -> Vec<ReminderAction> {
    match reminder_type {
        ReminderType::Upcoming => vec![ReminderAction::Upload, ReminderAction::Dismiss],
        ReminderType::Overdue | ReminderType::FollowUp => vec![
            ReminderAction::Upload,
            ReminderAction::Dismiss,
            ReminderAction::Snooze,
        ],
        ReminderType::FinalNotice => vec![
            ReminderAction::Upload,
            ReminderAction::Dismiss,
            ReminderAction::Snooze,
            ReminderAction::ContactSupport,
        ],
    }
}

/// Pure partition of an already generated batch; no reclassification.
pub fn group_reminders_by_urgency(
    reminders: &[DocumentReminder],
) -> BTreeMap<Urgency, Vec<DocumentReminder>> {
    let mut groups: BTreeMap<Urgency, Vec<DocumentReminder>> = BTreeMap::new();
    for reminder in reminders {
        groups
            .entry(reminder.urgency)
            .or_default()
            .push(reminder.clone());
    }
    groups
}

/// Pure partition of an already generated batch; no reclassification.
pub fn group_reminders_by_type(
    reminders: &[DocumentReminder],
) -> BTreeMap<ReminderType, Vec<DocumentReminder>> {
    let mut groups: BTreeMap<ReminderType, Vec<DocumentReminder>> = BTreeMap::new();
    for reminder in reminders {
        groups
            .entry(reminder.reminder_type)
            .or_default()
            .push(reminder.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, NaiveDate};

    use crate::analysis::missing::MissingDocument;
    use crate::analysis::types::{Confidence, MissingStatus, ReminderType, Urgency};

    use super::{
        GenerateOptions, ReminderSettings, generate_reminders, group_reminders_by_type,
        group_reminders_by_urgency,
    };

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn overdue_record(missing_id: &str, source: &str, days_overdue: i64) -> MissingDocument {
        let expected_date = day("2026-06-15");
        MissingDocument {
            missing_id: missing_id.to_string(),
            pattern_id: format!("pat_{missing_id}"),
            document_type: "bank_statement".to_string(),
            source: source.to_string(),
            expected_date,
            grace_period_end: expected_date + Duration::days(5),
            days_overdue,
            is_missing: days_overdue > 0,
            confidence: Confidence::High,
            historical_uploads: 6,
            last_upload_date: Some(day("2026-05-15")),
            status: MissingStatus::Pending,
        }
    }

    fn no_settings() -> BTreeMap<String, ReminderSettings> {
        BTreeMap::new()
    }

    #[test]
    fn five_days_overdue_is_an_overdue_high_reminder() {
        let missing = vec![overdue_record("mis_1", "Bank A", 5)];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );

        assert_eq!(result.total_reminders, 1);
        assert_eq!(result.reminders[0].reminder_type, ReminderType::Overdue);
        assert_eq!(result.reminders[0].urgency, Urgency::High);
    }

    #[test]
    fn twenty_days_overdue_is_a_critical_final_notice() {
        let missing = vec![overdue_record("mis_1", "Bank A", 20)];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );

        assert_eq!(result.reminders[0].reminder_type, ReminderType::FinalNotice);
        assert_eq!(result.reminders[0].urgency, Urgency::Critical);
        assert!(result.reminders[0].message.title.contains("Final Notice"));
        assert!(
            result.reminders[0]
                .message
                .body
                .contains("significantly overdue")
        );
    }

    #[test]
    fn disabled_settings_suppress_the_type_when_respected() {
        let missing = vec![overdue_record("mis_1", "Bank A", 5)];
        let mut settings = BTreeMap::new();
        let mut bank = ReminderSettings::default_for("bank_statement");
        bank.enabled = false;
        settings.insert("bank_statement".to_string(), bank);

        let respected = generate_reminders(
            &missing,
            &settings,
            &BTreeMap::new(),
            GenerateOptions {
                respect_settings: true,
            },
        );
        assert_eq!(respected.total_reminders, 0);
        assert_eq!(respected.total_pending, 1);

        let ignored = generate_reminders(
            &missing,
            &settings,
            &BTreeMap::new(),
            GenerateOptions {
                respect_settings: false,
            },
        );
        assert_eq!(ignored.total_reminders, 1);
    }

    #[test]
    fn records_at_the_reminder_cap_are_excluded_entirely() {
        let missing = vec![overdue_record("mis_1", "Bank A", 5)];
        let mut sent_counts = BTreeMap::new();
        sent_counts.insert("mis_1".to_string(), 4_i64);

        let result = generate_reminders(
            &missing,
            &no_settings(),
            &sent_counts,
            GenerateOptions::default(),
        );
        assert_eq!(result.total_reminders, 0);
    }

    #[test]
    fn terminal_records_are_skipped() {
        let mut dismissed = overdue_record("mis_1", "Bank A", 5);
        dismissed.status = MissingStatus::Dismissed;
        let mut uploaded = overdue_record("mis_2", "Bank B", 5);
        uploaded.status = MissingStatus::Uploaded;

        let result = generate_reminders(
            &[dismissed, uploaded],
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );
        assert_eq!(result.total_reminders, 0);
        assert_eq!(result.total_pending, 0);
    }

    #[test]
    fn missing_settings_fall_back_with_a_warning() {
        let missing = vec![overdue_record("mis_1", "Bank A", 5)];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );
        assert_eq!(result.total_reminders, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("bank_statement"));
    }

    #[test]
    fn upcoming_reminders_carry_only_upload_and_dismiss_actions() {
        let missing = vec![overdue_record("mis_1", "Bank A", 0)];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );
        assert_eq!(result.reminders[0].reminder_type, ReminderType::Upcoming);
        assert_eq!(result.reminders[0].actions.len(), 2);
    }

    #[test]
    fn grouping_round_trips_the_generated_set() {
        let missing = vec![
            overdue_record("mis_1", "Bank A", 0),
            overdue_record("mis_2", "Bank B", 5),
            overdue_record("mis_3", "Bank C", 10),
            overdue_record("mis_4", "Bank D", 20),
        ];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );
        assert_eq!(result.total_reminders, 4);

        let by_urgency = group_reminders_by_urgency(&result.reminders);
        let mut flattened: Vec<String> = by_urgency
            .values()
            .flatten()
            .map(|reminder| reminder.id.clone())
            .collect();
        flattened.sort();
        let mut original: Vec<String> = result
            .reminders
            .iter()
            .map(|reminder| reminder.id.clone())
            .collect();
        original.sort();
        assert_eq!(flattened, original);

        let by_type = group_reminders_by_type(&result.reminders);
        let regrouped_total: usize = by_type.values().map(Vec::len).sum();
        assert_eq!(regrouped_total, result.reminders.len());
    }

    #[test]
    fn counts_match_the_generated_buckets() {
        let missing = vec![
            overdue_record("mis_1", "Bank A", 0),
            overdue_record("mis_2", "Bank B", 5),
            overdue_record("mis_3", "Bank C", 20),
        ];
        let result = generate_reminders(
            &missing,
            &no_settings(),
            &BTreeMap::new(),
            GenerateOptions::default(),
        );
        assert_eq!(result.by_type.upcoming, 1);
        assert_eq!(result.by_type.overdue, 1);
        assert_eq!(result.by_type.final_notice, 1);
        assert_eq!(result.by_urgency.low, 1);
        assert_eq!(result.by_urgency.high, 1);
        assert_eq!(result.by_urgency.critical, 1);
    }
}
