use crate::analysis::types::{Confidence, Frequency, Stability};

/// Deterministic pattern-classification policy identifier.
///
/// Emitted with pattern and reminder results so future threshold changes
/// remain auditable and easy to reason about in diffs and support sessions.
pub const PATTERN_POLICY_VERSION: &str = "pattern/v1";

/// v1 pattern classifier policy.
///
/// Notes:
/// - Tolerance bands and overdue thresholds are tunable here, not at use
///   sites; the defaults match the canonical document cycles.
/// - Confidence floors are precision-first: a prediction must earn high
///   confidence before it may drive calendar entries.
#[derive(Debug, Clone, Copy)]
pub struct PatternPolicy {
    pub stable_cv_ceiling: f64,
    pub volatile_cv_floor: f64,
    pub high_confidence_min_uploads: i64,
    pub medium_confidence_min_uploads: i64,
    pub low_confidence_min_uploads: i64,
    pub default_grace_period_days: i64,
    pub annual_grace_period_days: i64,
    pub look_ahead_days: i64,
    pub overdue_threshold_days: i64,
    pub follow_up_threshold_days: i64,
}

impl PatternPolicy {
    /// Nearest-match frequency for an average interval, or irregular when
    /// the interval falls outside every tolerance band.
    pub fn frequency_for_interval(self, average_interval_days: f64) -> Frequency {
        let candidates = [
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::HalfYearly,
            Frequency::Yearly,
        ];

        let mut best: Option<(Frequency, f64)> = None;
        for frequency in candidates {
            let Some(period) = frequency.canonical_period_days() else {
                continue;
            };
            let distance = (average_interval_days - period).abs();
            let replace = match best {
                Some((_, best_distance)) => distance < best_distance,
                None => true,
            };
            if replace {
                best = Some((frequency, distance));
            }
        }

        match best {
            Some((frequency, distance)) if distance <= self.frequency_tolerance_days(frequency) => {
                frequency
            }
            _ => Frequency::Irregular,
        }
    }

    pub fn frequency_tolerance_days(self, frequency: Frequency) -> f64 {
        match frequency {
            Frequency::Monthly => 7.0,
            Frequency::Quarterly => 14.0,
            Frequency::HalfYearly => 21.0,
            Frequency::Yearly => 45.0,
            Frequency::Irregular | Frequency::Unknown => 0.0,
        }
    }

    pub fn stability_for_variation(self, coefficient_of_variation: f64) -> Stability {
        if coefficient_of_variation < self.stable_cv_ceiling {
            return Stability::Stable;
        }
        if coefficient_of_variation < self.volatile_cv_floor {
            return Stability::Changing;
        }
        Stability::Volatile
    }

    /// Strict precedence chain: evaluate top-down, first match wins.
    pub fn confidence_for(self, uploads_analyzed: i64, stability: Stability) -> Confidence {
        if uploads_analyzed >= self.high_confidence_min_uploads && stability == Stability::Stable {
            return Confidence::High;
        }
        if uploads_analyzed >= self.medium_confidence_min_uploads && stability != Stability::Volatile
        {
            return Confidence::Medium;
        }
        if uploads_analyzed >= self.low_confidence_min_uploads {
            return Confidence::Low;
        }
        Confidence::Uncertain
    }

    /// Grace buffer after the predicted date before a document counts as
    /// missing. Annual documents get a longer buffer.
    pub fn grace_period_days(self, frequency: Frequency) -> i64 {
        match frequency {
            Frequency::Yearly => self.annual_grace_period_days,
            _ => self.default_grace_period_days,
        }
    }
}

pub const PATTERN_POLICY_V1: PatternPolicy = PatternPolicy {
    stable_cv_ceiling: 0.15,
    volatile_cv_floor: 0.40,
    high_confidence_min_uploads: 4,
    medium_confidence_min_uploads: 3,
    low_confidence_min_uploads: 2,
    default_grace_period_days: 5,
    annual_grace_period_days: 14,
    look_ahead_days: 7,
    overdue_threshold_days: 7,
    follow_up_threshold_days: 14,
};

#[cfg(test)]
mod tests {
    use crate::analysis::types::{Confidence, Frequency, Stability};

    use super::PATTERN_POLICY_V1;

    #[test]
    fn frequency_bands_use_nearest_match() {
        let policy = PATTERN_POLICY_V1;
        assert_eq!(policy.frequency_for_interval(30.0), Frequency::Monthly);
        assert_eq!(policy.frequency_for_interval(33.5), Frequency::Monthly);
        assert_eq!(policy.frequency_for_interval(91.0), Frequency::Quarterly);
        assert_eq!(policy.frequency_for_interval(180.0), Frequency::HalfYearly);
        assert_eq!(policy.frequency_for_interval(360.0), Frequency::Yearly);
    }

    #[test]
    fn intervals_outside_every_band_are_irregular() {
        let policy = PATTERN_POLICY_V1;
        assert_eq!(policy.frequency_for_interval(50.0), Frequency::Irregular);
        assert_eq!(policy.frequency_for_interval(130.0), Frequency::Irregular);
        assert_eq!(policy.frequency_for_interval(600.0), Frequency::Irregular);
    }

    #[test]
    fn stability_boundaries_are_half_open() {
        let policy = PATTERN_POLICY_V1;
        assert_eq!(policy.stability_for_variation(0.1499), Stability::Stable);
        assert_eq!(policy.stability_for_variation(0.15), Stability::Changing);
        assert_eq!(policy.stability_for_variation(0.3999), Stability::Changing);
        assert_eq!(policy.stability_for_variation(0.40), Stability::Volatile);
    }

    #[test]
    fn confidence_precedence_is_strict() {
        let policy = PATTERN_POLICY_V1;
        assert_eq!(policy.confidence_for(4, Stability::Stable), Confidence::High);
        assert_eq!(
            policy.confidence_for(4, Stability::Changing),
            Confidence::Medium
        );
        assert_eq!(
            policy.confidence_for(3, Stability::Volatile),
            Confidence::Low
        );
        assert_eq!(
            policy.confidence_for(2, Stability::Volatile),
            Confidence::Low
        );
        assert_eq!(
            policy.confidence_for(1, Stability::Stable),
            Confidence::Uncertain
        );
    }

    #[test]
    fn annual_documents_get_a_longer_grace_period() {
        let policy = PATTERN_POLICY_V1;
        assert!(
            policy.grace_period_days(Frequency::Yearly)
                > policy.grace_period_days(Frequency::Monthly)
        );
    }
}
