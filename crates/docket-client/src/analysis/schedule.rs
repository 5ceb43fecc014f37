use chrono::{Duration, NaiveDate};

use crate::analysis::missing::MissingDocument;

/// Static send-offset table for one document type.
///
/// `before_due` entries are days before the expected date (descending),
/// `after_due` entries are days after it (ascending); both are indexed by
/// how many reminders have already gone out, clamping at the final entry.
#[derive(Debug, Clone, Copy)]
pub struct ReminderSchedule {
    pub before_due: &'static [i64],
    pub after_due: &'static [i64],
    pub max_reminders: i64,
}

const BANK_STATEMENT_SCHEDULE: ReminderSchedule = ReminderSchedule {
    before_due: &[3, 1],
    after_due: &[3, 7, 14, 21],
    max_reminders: 4,
};

const DIVIDEND_STATEMENT_SCHEDULE: ReminderSchedule = ReminderSchedule {
    before_due: &[5, 1],
    after_due: &[5, 10, 21],
    max_reminders: 4,
};

const PAYG_SUMMARY_SCHEDULE: ReminderSchedule = ReminderSchedule {
    before_due: &[14, 7],
    after_due: &[21, 35, 49],
    max_reminders: 6,
};

const DEFAULT_SCHEDULE: ReminderSchedule = ReminderSchedule {
    before_due: &[7, 3],
    after_due: &[7, 14, 28],
    max_reminders: 4,
};

pub fn reminder_schedule(document_type: &str) -> ReminderSchedule {
    match document_type {
        "bank_statement" | "credit_card_statement" => BANK_STATEMENT_SCHEDULE,
        "dividend_statement" | "interest_statement" => DIVIDEND_STATEMENT_SCHEDULE,
        "payg_summary" => PAYG_SUMMARY_SCHEDULE,
        _ => DEFAULT_SCHEDULE,
    }
}

/// Next eligible send date for a missing document, or `None` once the
/// type's reminder budget is exhausted. Pure in `(missing, reminders_sent)`.
pub fn calculate_next_reminder_date(
    missing: &MissingDocument,
    reminders_sent: i64,
) -> Option<NaiveDate> {
    let schedule = reminder_schedule(&missing.document_type);
    if reminders_sent >= schedule.max_reminders {
        return None;
    }

    if missing.is_missing {
        let offset = schedule_entry(schedule.after_due, reminders_sent)?;
        return Some(missing.expected_date + Duration::days(offset));
    }

    let offset = schedule_entry(schedule.before_due, reminders_sent)?;
    Some(missing.expected_date - Duration::days(offset))
}

fn schedule_entry(entries: &[i64], reminders_sent: i64) -> Option<i64> {
    if entries.is_empty() {
        return None;
    }
    let index = usize::try_from(reminders_sent).unwrap_or(0);
    Some(entries[index.min(entries.len() - 1)])
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::analysis::missing::MissingDocument;
    use crate::analysis::types::{Confidence, MissingStatus};

    use super::{calculate_next_reminder_date, reminder_schedule};

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn missing(document_type: &str, is_missing: bool) -> MissingDocument {
        let expected_date = day("2026-06-15");
        MissingDocument {
            missing_id: "mis_1".to_string(),
            pattern_id: "pat_1".to_string(),
            document_type: document_type.to_string(),
            source: "CBA".to_string(),
            expected_date,
            grace_period_end: expected_date + Duration::days(5),
            days_overdue: if is_missing { 3 } else { 0 },
            is_missing,
            confidence: Confidence::High,
            historical_uploads: 5,
            last_upload_date: Some(day("2026-05-15")),
            status: MissingStatus::Pending,
        }
    }

    #[test]
    fn known_types_have_their_own_schedules() {
        assert!(reminder_schedule("bank_statement").before_due.contains(&3));
        assert!(reminder_schedule("bank_statement").after_due.contains(&3));
        assert_eq!(reminder_schedule("bank_statement").max_reminders, 4);

        assert!(reminder_schedule("payg_summary").before_due.contains(&14));
        assert!(reminder_schedule("payg_summary").after_due.contains(&21));
        assert_eq!(reminder_schedule("payg_summary").max_reminders, 6);
    }

    #[test]
    fn unknown_types_fall_back_to_a_non_empty_default() {
        let schedule = reminder_schedule("trust_distribution");
        assert!(!schedule.before_due.is_empty());
        assert!(!schedule.after_due.is_empty());
        assert!(schedule.max_reminders > 0);
    }

    #[test]
    fn before_due_reminders_land_strictly_before_the_expected_date() {
        let record = missing("bank_statement", false);
        let next = calculate_next_reminder_date(&record, 0);
        assert_eq!(next, Some(day("2026-06-12")));
        let later = calculate_next_reminder_date(&record, 1);
        assert_eq!(later, Some(day("2026-06-14")));
        for sent in 0..4 {
            if let Some(date) = calculate_next_reminder_date(&record, sent) {
                assert!(date < record.expected_date);
            }
        }
    }

    #[test]
    fn overdue_reminders_land_strictly_after_the_expected_date() {
        let record = missing("bank_statement", true);
        assert_eq!(calculate_next_reminder_date(&record, 0), Some(day("2026-06-18")));
        assert_eq!(calculate_next_reminder_date(&record, 1), Some(day("2026-06-22")));
        for sent in 0..4 {
            if let Some(date) = calculate_next_reminder_date(&record, sent) {
                assert!(date > record.expected_date);
            }
        }
    }

    #[test]
    fn schedule_is_monotonic_in_reminders_sent_until_the_cap() {
        let record = missing("payg_summary", true);
        let mut previous: Option<NaiveDate> = None;
        let mut reached_cap = false;
        for sent in 0..10 {
            match calculate_next_reminder_date(&record, sent) {
                Some(date) => {
                    assert!(!reached_cap);
                    if let Some(previous_date) = previous {
                        assert!(date >= previous_date);
                    }
                    previous = Some(date);
                }
                None => reached_cap = true,
            }
        }
        assert!(reached_cap);
    }

    #[test]
    fn cap_returns_none_not_an_error() {
        let record = missing("bank_statement", true);
        assert!(calculate_next_reminder_date(&record, 4).is_none());
        assert!(calculate_next_reminder_date(&record, 40).is_none());
    }
}
