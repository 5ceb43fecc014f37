use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use ulid::Ulid;

use crate::analysis::policy::{PATTERN_POLICY_V1, PatternPolicy};
use crate::analysis::stats::interval_stats;
use crate::analysis::types::{Confidence, Frequency, Stability, UploadEvent, pattern_key};

#[derive(Debug, Clone)]
pub struct PatternChange {
    pub changed_at: NaiveDate,
    pub field: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct DocumentPattern {
    pub pattern_id: String,
    pub document_type: String,
    pub source: String,
    pub frequency: Frequency,
    pub stability: Stability,
    pub confidence: Confidence,
    pub average_interval_days: Option<f64>,
    pub stddev_interval_days: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    pub uploads_analyzed: i64,
    pub last_upload_date: Option<NaiveDate>,
    pub next_expected_date: Option<NaiveDate>,
    pub pattern_changes: Vec<PatternChange>,
}

impl DocumentPattern {
    pub fn key(&self) -> String {
        pattern_key(&self.document_type, &self.source)
    }
}

#[derive(Debug, Clone)]
struct SourceGroup {
    document_type: String,
    source: String,
    dates: Vec<NaiveDate>,
}

/// Recompute every pattern wholesale from the upload history.
///
/// Previously stored patterns are consulted only for identity (pattern ids
/// survive reruns) and for change tracking; their statistics are discarded.
pub fn detect_patterns(
    uploads: &[UploadEvent],
    previous: &[DocumentPattern],
    as_of: NaiveDate,
) -> Vec<DocumentPattern> {
    detect_patterns_with_policy(uploads, previous, as_of, PATTERN_POLICY_V1)
}

pub fn detect_patterns_with_policy(
    uploads: &[UploadEvent],
    previous: &[DocumentPattern],
    as_of: NaiveDate,
    policy: PatternPolicy,
) -> Vec<DocumentPattern> {
    let mut groups: BTreeMap<String, SourceGroup> = BTreeMap::new();
    for upload in uploads {
        let entry = groups
            .entry(upload.pattern_key())
            .or_insert_with(|| SourceGroup {
                document_type: upload.document_type.clone(),
                source: upload.source.clone(),
                dates: Vec::new(),
            });
        entry.dates.push(upload.uploaded_at);
    }

    let previous_by_key: BTreeMap<String, &DocumentPattern> = previous
        .iter()
        .map(|pattern| (pattern.key(), pattern))
        .collect();

    let mut patterns: Vec<DocumentPattern> = Vec::new();
    for (key, group) in &mut groups {
        group.dates.sort_unstable();
        let prior = previous_by_key.get(key).copied();
        patterns.push(classify_group(group, prior, as_of, policy));
    }

    patterns.sort_by(compare_patterns);
    patterns
}

fn classify_group(
    group: &SourceGroup,
    prior: Option<&DocumentPattern>,
    as_of: NaiveDate,
    policy: PatternPolicy,
) -> DocumentPattern {
    let stats = interval_stats(&group.dates);
    let uploads_analyzed = stats.count as i64;
    let last_upload_date = group.dates.last().copied();

    let frequency = match stats.average_interval_days {
        Some(average) => policy.frequency_for_interval(average),
        None => Frequency::Unknown,
    };

    let stability = match stats.coefficient_of_variation {
        Some(variation) => policy.stability_for_variation(variation),
        // A flat zero-day average has no meaningful spread either way.
        None if stats.average_interval_days.is_some() => Stability::Stable,
        None => Stability::Volatile,
    };

    let confidence = policy.confidence_for(uploads_analyzed, stability);

    let next_expected_date = match (frequency, last_upload_date, stats.average_interval_days) {
        (Frequency::Unknown, _, _) => None,
        (_, Some(last), Some(average)) => Some(last + Duration::days(average.round() as i64)),
        _ => None,
    };

    let pattern_id = prior
        .map(|pattern| pattern.pattern_id.clone())
        .unwrap_or_else(|| format!("pat_{}", Ulid::new()));

    let mut pattern_changes = prior
        .map(|pattern| pattern.pattern_changes.clone())
        .unwrap_or_default();
    if let Some(previous_pattern) = prior {
        if previous_pattern.frequency != frequency {
            pattern_changes.push(PatternChange {
                changed_at: as_of,
                field: "frequency".to_string(),
                from: previous_pattern.frequency.as_str().to_string(),
                to: frequency.as_str().to_string(),
            });
        }
        if previous_pattern.stability != stability {
            pattern_changes.push(PatternChange {
                changed_at: as_of,
                field: "stability".to_string(),
                from: previous_pattern.stability.as_str().to_string(),
                to: stability.as_str().to_string(),
            });
        }
    }

    DocumentPattern {
        pattern_id,
        document_type: group.document_type.clone(),
        source: group.source.clone(),
        frequency,
        stability,
        confidence,
        average_interval_days: stats.average_interval_days.map(|value| round_to(value, 2)),
        stddev_interval_days: stats.stddev_interval_days.map(|value| round_to(value, 2)),
        coefficient_of_variation: stats
            .coefficient_of_variation
            .map(|value| round_to(value, 4)),
        uploads_analyzed,
        last_upload_date,
        next_expected_date,
        pattern_changes,
    }
}

fn compare_patterns(left: &DocumentPattern, right: &DocumentPattern) -> Ordering {
    compare_optional_dates(left.next_expected_date, right.next_expected_date)
        .then_with(|| left.document_type.cmp(&right.document_type))
        .then_with(|| left.source.cmp(&right.source))
}

fn compare_optional_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
