use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use ulid::Ulid;

use crate::analysis::pattern::DocumentPattern;
use crate::analysis::policy::{PATTERN_POLICY_V1, PatternPolicy};
use crate::analysis::types::{Confidence, MissingStatus, UploadEvent};

#[derive(Debug, Clone)]
pub struct MissingDocument {
    pub missing_id: String,
    pub pattern_id: String,
    pub document_type: String,
    pub source: String,
    pub expected_date: NaiveDate,
    pub grace_period_end: NaiveDate,
    pub days_overdue: i64,
    pub is_missing: bool,
    pub confidence: Confidence,
    pub historical_uploads: i64,
    pub last_upload_date: Option<NaiveDate>,
    pub status: MissingStatus,
}

/// Stateless detection pass over the current patterns.
///
/// Emits one record per pattern whose prediction is inside the look-ahead
/// window or past its grace period, skipping patterns already satisfied by
/// an upload on or after the expected date. Idempotent per run; persisting
/// records and their status transitions is the store's job.
pub fn detect_missing(
    patterns: &[DocumentPattern],
    uploads: &[UploadEvent],
    as_of: NaiveDate,
) -> Vec<MissingDocument> {
    detect_missing_with_policy(patterns, uploads, as_of, PATTERN_POLICY_V1)
}

pub fn detect_missing_with_policy(
    patterns: &[DocumentPattern],
    uploads: &[UploadEvent],
    as_of: NaiveDate,
    policy: PatternPolicy,
) -> Vec<MissingDocument> {
    let latest_upload_by_key = latest_uploads(uploads);

    let mut detections: Vec<MissingDocument> = Vec::new();
    for pattern in patterns {
        let Some(expected_date) = pattern.next_expected_date else {
            continue;
        };
        // A lone historical upload must never flag a document missing.
        if pattern.uploads_analyzed < 2 {
            continue;
        }

        if let Some(latest) = latest_upload_by_key.get(&pattern.key())
            && *latest >= expected_date
        {
            continue;
        }

        let grace_period_end =
            expected_date + Duration::days(policy.grace_period_days(pattern.frequency));

        let record = if as_of < expected_date {
            let days_until = (expected_date - as_of).num_days();
            if days_until > policy.look_ahead_days {
                continue;
            }
            build_record(pattern, expected_date, grace_period_end, 0, false)
        } else if as_of <= grace_period_end {
            // Inside the grace window: stay silent.
            continue;
        } else {
            let days_overdue = (as_of - grace_period_end).num_days();
            build_record(pattern, expected_date, grace_period_end, days_overdue, true)
        };

        detections.push(record);
    }

    detections.sort_by(compare_detections);
    detections
}

fn build_record(
    pattern: &DocumentPattern,
    expected_date: NaiveDate,
    grace_period_end: NaiveDate,
    days_overdue: i64,
    is_missing: bool,
) -> MissingDocument {
    MissingDocument {
        missing_id: format!("mis_{}", Ulid::new()),
        pattern_id: pattern.pattern_id.clone(),
        document_type: pattern.document_type.clone(),
        source: pattern.source.clone(),
        expected_date,
        grace_period_end,
        days_overdue,
        is_missing,
        confidence: pattern.confidence,
        historical_uploads: pattern.uploads_analyzed,
        last_upload_date: pattern.last_upload_date,
        status: MissingStatus::Pending,
    }
}

fn latest_uploads(uploads: &[UploadEvent]) -> BTreeMap<String, NaiveDate> {
    let mut latest: BTreeMap<String, NaiveDate> = BTreeMap::new();
    for upload in uploads {
        let entry = latest
            .entry(upload.pattern_key())
            .or_insert(upload.uploaded_at);
        if upload.uploaded_at > *entry {
            *entry = upload.uploaded_at;
        }
    }
    latest
}

fn compare_detections(left: &MissingDocument, right: &MissingDocument) -> Ordering {
    right
        .days_overdue
        .cmp(&left.days_overdue)
        .then_with(|| left.expected_date.cmp(&right.expected_date))
        .then_with(|| left.document_type.cmp(&right.document_type))
        .then_with(|| left.source.cmp(&right.source))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::analysis::pattern::detect_patterns;
    use crate::analysis::types::UploadEvent;

    use super::detect_missing;

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
    }

    fn monthly_uploads(source: &str, months: u32) -> Vec<UploadEvent> {
        (1..=months)
            .filter_map(|month| NaiveDate::from_ymd_opt(2026, month, 15))
            .map(|date| UploadEvent {
                upload_id: format!("upl_{source}_{date}"),
                document_type: "bank_statement".to_string(),
                source: source.to_string(),
                uploaded_at: date,
            })
            .collect()
    }

    #[test]
    fn grace_window_is_silent() {
        let uploads = monthly_uploads("CBA", 5);
        let patterns = detect_patterns(&uploads, &[], day("2026-06-16"));
        // Expected 2026-06-14 (May 15 + 30-day average), grace 5 days.
        let detections = detect_missing(&patterns, &uploads, day("2026-06-17"));
        assert!(detections.is_empty());
    }

    #[test]
    fn past_grace_period_the_document_is_missing() {
        let uploads = monthly_uploads("CBA", 5);
        let patterns = detect_patterns(&uploads, &[], day("2026-06-25"));
        let detections = detect_missing(&patterns, &uploads, day("2026-06-25"));
        assert_eq!(detections.len(), 1);
        let record = &detections[0];
        assert!(record.is_missing);
        assert_eq!(record.expected_date, day("2026-06-14"));
        assert_eq!(record.grace_period_end, day("2026-06-19"));
        assert_eq!(record.days_overdue, 6);
    }

    #[test]
    fn upcoming_documents_surface_only_inside_the_look_ahead_window() {
        let uploads = monthly_uploads("CBA", 5);
        let patterns = detect_patterns(&uploads, &[], day("2026-06-01"));

        let too_early = detect_missing(&patterns, &uploads, day("2026-06-01"));
        assert!(too_early.is_empty());

        let within_window = detect_missing(&patterns, &uploads, day("2026-06-10"));
        assert_eq!(within_window.len(), 1);
        assert!(!within_window[0].is_missing);
        assert_eq!(within_window[0].days_overdue, 0);
    }

    #[test]
    fn a_matching_upload_clears_the_detection() {
        let mut uploads = monthly_uploads("CBA", 5);
        let patterns = detect_patterns(&uploads, &[], day("2026-06-25"));
        uploads.push(UploadEvent {
            upload_id: "upl_june".to_string(),
            document_type: "bank_statement".to_string(),
            source: "CBA".to_string(),
            uploaded_at: day("2026-06-16"),
        });

        let detections = detect_missing(&patterns, &uploads, day("2026-06-25"));
        assert!(detections.is_empty());
    }

    #[test]
    fn overdue_invariant_holds_for_every_detection() {
        let uploads = monthly_uploads("CBA", 6);
        let patterns = detect_patterns(&uploads, &[], day("2026-08-30"));
        for as_of in ["2026-07-10", "2026-07-25", "2026-08-30"] {
            let detections = detect_missing(&patterns, &uploads, day(as_of));
            for record in detections {
                assert_eq!(record.is_missing, record.days_overdue > 0);
            }
        }
    }
}
