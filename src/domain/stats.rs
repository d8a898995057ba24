//! Cycle statistics: gap samples, mean, spread, and bleed duration.
//!
//! Consumed by the risk engine, the anomaly detector, and the forecaster.

use serde::Serialize;

use super::cycle::{CycleRecord, DEFAULT_CYCLE_LENGTH};

/// A start-to-start gap is a valid sample only when strictly inside
/// (`VALID_GAP_MIN`, `VALID_GAP_MAX`) days.
pub const VALID_GAP_MIN: i64 = 20;
pub const VALID_GAP_MAX: i64 = 45;

/// Bleed duration assumed when no record carries a plausible one.
pub const DEFAULT_BLEED_DURATION: f64 = 5.0;

/// Descriptive statistics over a cycle history.
///
/// With fewer than two records (or no valid samples) the means are absent
/// and the `*_or_default` accessors supply the sentinels so callers can
/// always render a result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatistics {
    /// Valid start-to-start gaps in chronological order
    pub gaps: Vec<i64>,

    /// Arithmetic mean of the valid gaps
    pub mean_gap: Option<f64>,

    /// Population standard deviation of the valid gaps
    pub std_dev: Option<f64>,

    /// Mean bleed duration over records with duration in (0, 10)
    pub mean_duration: Option<f64>,
}

impl CycleStatistics {
    /// Derive statistics from an ordered cycle history.
    #[must_use]
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let gaps = valid_gaps(records);

        let mean_gap = if gaps.is_empty() {
            None
        } else {
            Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
        };

        let std_dev = mean_gap.map(|mean| {
            let variance = gaps
                .iter()
                .map(|&gap| (gap as f64 - mean).powi(2))
                .sum::<f64>()
                / gaps.len() as f64;
            variance.sqrt()
        });

        let durations: Vec<i64> = records
            .iter()
            .map(|r| r.duration)
            .filter(|&d| d > 0 && d < 10)
            .collect();

        let mean_duration = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
        };

        Self {
            gaps,
            mean_gap,
            std_dev,
            mean_duration,
        }
    }

    /// Number of valid gap samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.gaps.len()
    }

    /// Mean gap, or the 28-day sentinel when no valid samples exist.
    #[must_use]
    pub fn mean_gap_or_default(&self) -> f64 {
        self.mean_gap.unwrap_or(DEFAULT_CYCLE_LENGTH as f64)
    }

    /// Mean bleed duration, or the 5-day sentinel.
    #[must_use]
    pub fn mean_duration_or_default(&self) -> f64 {
        self.mean_duration.unwrap_or(DEFAULT_BLEED_DURATION)
    }
}

/// Start-to-start gaps between consecutive records, unfiltered.
#[must_use]
pub(crate) fn start_gaps(records: &[CycleRecord]) -> Vec<i64> {
    records
        .windows(2)
        .map(|pair| (pair[1].start_date - pair[0].start_date).num_days())
        .collect()
}

/// Gaps strictly inside the valid range.
#[must_use]
pub(crate) fn valid_gaps(records: &[CycleRecord]) -> Vec<i64> {
    start_gaps(records)
        .into_iter()
        .filter(|&days| days > VALID_GAP_MIN && days < VALID_GAP_MAX)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlowIntensity;
    use chrono::NaiveDate;

    fn cycle(start: &str, duration: i64) -> CycleRecord {
        let start_date: NaiveDate = start.parse().expect("Should parse date");
        let end_date = start_date + chrono::Duration::days(duration - 1);
        CycleRecord::new(start_date, end_date, FlowIntensity::Moderate, None)
            .expect("Should create record")
    }

    #[test]
    fn test_insufficient_data_sentinels() {
        let stats = CycleStatistics::from_records(&[cycle("2024-03-01", 5)]);

        assert!(stats.gaps.is_empty());
        assert!(stats.mean_gap.is_none());
        assert!(stats.std_dev.is_none());
        assert!((stats.mean_gap_or_default() - 28.0).abs() < f64::EPSILON);
        assert!((stats.mean_duration_or_default() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gap_filter_is_strict() {
        // Gaps: 20 (excluded), 28 (kept), 45 (excluded)
        let records = vec![
            cycle("2024-01-01", 5),
            cycle("2024-01-21", 5),
            cycle("2024-02-18", 5),
            cycle("2024-04-03", 5),
        ];
        let stats = CycleStatistics::from_records(&records);

        assert_eq!(stats.gaps, vec![28]);
        assert!((stats.mean_gap.expect("Should have mean") - 28.0).abs() < f64::EPSILON);
        assert!((stats.std_dev.expect("Should have std dev")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_population_standard_deviation() {
        // Gaps: 26 and 30, mean 28, population std dev 2
        let records = vec![
            cycle("2024-01-01", 5),
            cycle("2024-01-27", 5),
            cycle("2024-02-26", 5),
        ];
        let stats = CycleStatistics::from_records(&records);

        assert!((stats.mean_gap.expect("Should have mean") - 28.0).abs() < f64::EPSILON);
        assert!((stats.std_dev.expect("Should have std dev") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_duration_ignores_implausible() {
        let mut long = cycle("2024-01-01", 5);
        long.duration = 12; // outside (0, 10)
        let records = vec![long, cycle("2024-01-29", 4), cycle("2024-02-26", 6)];
        let stats = CycleStatistics::from_records(&records);

        assert!((stats.mean_duration.expect("Should have mean") - 5.0).abs() < f64::EPSILON);
    }
}
