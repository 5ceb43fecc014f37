use chrono::NaiveDate;
use ulid::Ulid;

use crate::analysis::missing::MissingDocument;
use crate::analysis::types::document_type_label;

pub const TAX_DEADLINE_TYPE_CUSTOM: &str = "custom";

/// Calendar entry synthesized from a missing-document record.
#[derive(Debug, Clone)]
pub struct TaxDeadline {
    pub deadline_id: String,
    pub missing_document_id: String,
    pub pattern_id: String,
    pub deadline_type: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub document_type: String,
    pub source: String,
    pub is_upload_reminder: bool,
}

/// Bridge a missing document onto the tax calendar.
///
/// Low and uncertain confidence records return `None`: unproven patterns
/// must not pollute the user's calendar.
pub fn deadline_from_missing(missing: &MissingDocument) -> Option<TaxDeadline> {
    if !missing.confidence.is_calendar_worthy() {
        return None;
    }

    let label = document_type_label(&missing.document_type);
    Some(TaxDeadline {
        deadline_id: format!("ddl_{}", Ulid::new()),
        missing_document_id: missing.missing_id.clone(),
        pattern_id: missing.pattern_id.clone(),
        deadline_type: TAX_DEADLINE_TYPE_CUSTOM.to_string(),
        title: format!("Upload {label} from {}", missing.source),
        due_date: missing.expected_date,
        document_type: missing.document_type.clone(),
        source: missing.source.clone(),
        is_upload_reminder: true,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::analysis::missing::MissingDocument;
    use crate::analysis::types::{Confidence, MissingStatus};

    use super::{TAX_DEADLINE_TYPE_CUSTOM, deadline_from_missing};

    fn record(confidence: Confidence) -> MissingDocument {
        let expected_date =
            NaiveDate::parse_from_str("2026-06-15", "%Y-%m-%d").unwrap_or(NaiveDate::MIN);
        MissingDocument {
            missing_id: "mis_1".to_string(),
            pattern_id: "pat_1".to_string(),
            document_type: "payg_summary".to_string(),
            source: "Acme Pty Ltd".to_string(),
            expected_date,
            grace_period_end: expected_date + Duration::days(14),
            days_overdue: 3,
            is_missing: true,
            confidence,
            historical_uploads: 4,
            last_upload_date: None,
            status: MissingStatus::Pending,
        }
    }

    #[test]
    fn confidence_gates_the_calendar_for_all_levels() {
        for confidence in [Confidence::High, Confidence::Medium] {
            assert!(deadline_from_missing(&record(confidence)).is_some());
        }
        for confidence in [Confidence::Low, Confidence::Uncertain] {
            assert!(deadline_from_missing(&record(confidence)).is_none());
        }
    }

    #[test]
    fn deadline_carries_traceability_back_to_the_record() {
        let deadline = deadline_from_missing(&record(Confidence::High));
        assert!(deadline.is_some());
        if let Some(entry) = deadline {
            assert_eq!(entry.deadline_type, TAX_DEADLINE_TYPE_CUSTOM);
            assert_eq!(entry.missing_document_id, "mis_1");
            assert_eq!(entry.pattern_id, "pat_1");
            assert!(entry.is_upload_reminder);
            assert!(entry.title.contains("PAYG payment summary"));
            assert!(entry.title.contains("Acme Pty Ltd"));
        }
    }
}
