use chrono::NaiveDate;

/// Interval statistics over one source's ascending upload dates.
///
/// `count` is the number of uploads, not intervals. With fewer than two
/// uploads there are no intervals and every derived field is `None`; callers
/// must treat that as an unknown frequency rather than an error.
#[derive(Debug, Clone, Copy)]
pub struct IntervalStats {
    pub count: usize,
    pub average_interval_days: Option<f64>,
    pub stddev_interval_days: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
}

pub fn interval_stats(dates: &[NaiveDate]) -> IntervalStats {
    if dates.len() < 2 {
        return IntervalStats {
            count: dates.len(),
            average_interval_days: None,
            stddev_interval_days: None,
            coefficient_of_variation: None,
        };
    }

    let mut deltas: Vec<f64> = Vec::with_capacity(dates.len() - 1);
    for index in 1..dates.len() {
        let delta = (dates[index] - dates[index - 1]).num_days();
        deltas.push(delta as f64);
    }

    let average = deltas.iter().sum::<f64>() / (deltas.len() as f64);
    let variance = deltas
        .iter()
        .map(|delta| {
            let diff = delta - average;
            diff * diff
        })
        .sum::<f64>()
        / (deltas.len() as f64);
    let stddev = variance.sqrt();

    let coefficient_of_variation = if average > 0.0 {
        Some(stddev / average)
    } else {
        None
    };

    IntervalStats {
        count: dates.len(),
        average_interval_days: Some(average),
        stddev_interval_days: Some(stddev),
        coefficient_of_variation,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::interval_stats;

    fn dates(values: &[&str]) -> Vec<NaiveDate> {
        values
            .iter()
            .filter_map(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
            .collect()
    }

    #[test]
    fn fewer_than_two_uploads_yield_no_intervals() {
        let stats = interval_stats(&dates(&["2026-01-15"]));
        assert_eq!(stats.count, 1);
        assert!(stats.average_interval_days.is_none());
        assert!(stats.stddev_interval_days.is_none());
        assert!(stats.coefficient_of_variation.is_none());
    }

    #[test]
    fn perfectly_regular_intervals_have_zero_variation() {
        let stats = interval_stats(&dates(&[
            "2026-01-15",
            "2026-02-14",
            "2026-03-16",
            "2026-04-15",
        ]));
        assert_eq!(stats.count, 4);
        assert_eq!(stats.average_interval_days, Some(30.0));
        assert_eq!(stats.stddev_interval_days, Some(0.0));
        assert_eq!(stats.coefficient_of_variation, Some(0.0));
    }

    #[test]
    fn stddev_is_population_not_sample() {
        // Deltas 10 and 30: mean 20, population variance 100, stddev 10.
        let stats = interval_stats(&dates(&["2026-01-01", "2026-01-11", "2026-02-10"]));
        assert_eq!(stats.average_interval_days, Some(20.0));
        assert_eq!(stats.stddev_interval_days, Some(10.0));
        assert_eq!(stats.coefficient_of_variation, Some(0.5));
    }

    #[test]
    fn same_day_uploads_leave_variation_undefined() {
        let stats = interval_stats(&dates(&["2026-01-01", "2026-01-01", "2026-01-01"]));
        assert_eq!(stats.average_interval_days, Some(0.0));
        assert!(stats.coefficient_of_variation.is_none());
    }
}
