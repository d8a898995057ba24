//! Cycle forecasting: weighted moving average with calendar projection.
//!
//! Recent cycles carry more signal than old ones, so with three or more
//! valid samples the average weights the most recent at 0.5, the second
//! most recent at 0.3, and the mean of everything older at 0.2.
//! Projections are anchored to "today": candidate windows that would land
//! in the past are discarded and the survivors renumbered from 1.

use chrono::{Duration, Local, NaiveDate};

use crate::domain::{
    Confidence, CycleForecast, CycleRecord, CycleStatistics, PredictedWindow,
    DEFAULT_CYCLE_LENGTH,
};
use crate::Result;

use super::ensure_valid_history;

/// Forecast the next period windows anchored to the local date.
///
/// # Errors
/// Returns `LunaraError::Validation` when the history is malformed.
pub fn project_now(cycles: &[CycleRecord]) -> Result<Option<CycleForecast>> {
    project(cycles, Local::now().date_naive())
}

/// Forecast the next period windows anchored to an explicit date.
///
/// Returns `Ok(None)` when the history is empty.
///
/// # Errors
/// Returns `LunaraError::Validation` when the history is malformed.
pub fn project(cycles: &[CycleRecord], today: NaiveDate) -> Result<Option<CycleForecast>> {
    ensure_valid_history(cycles)?;

    let Some(last) = cycles.last() else {
        return Ok(None);
    };

    let stats = CycleStatistics::from_records(cycles);
    let avg_cycle_length = weighted_average(&stats.gaps);
    let avg_duration = stats.mean_duration_or_default().round() as i64;

    let days_since_last_end = (today - last.end_date).num_days();
    let days_until_next = avg_cycle_length - days_since_last_end;

    let mut predictions = Vec::new();
    for month in 1..=3i64 {
        let start = today + Duration::days(days_until_next + avg_cycle_length * (month - 1));
        if start < today {
            continue;
        }

        let end = start + Duration::days(avg_duration - 1);
        predictions.push(PredictedWindow {
            // Renumber to account for skipped months
            month: predictions.len() as u32 + 1,
            start_date: start,
            end_date: end,
        });
    }

    let confidence = Confidence::from_samples(stats.sample_count());
    tracing::debug!(
        "Forecast: {} windows, avg cycle {} days, confidence {}",
        predictions.len(),
        avg_cycle_length,
        confidence
    );

    Ok(Some(CycleForecast {
        predictions,
        avg_cycle_length,
        avg_duration,
        confidence,
    }))
}

/// Weighted average of valid gap samples, in chronological order.
fn weighted_average(gaps: &[i64]) -> i64 {
    match gaps.len() {
        0 => DEFAULT_CYCLE_LENGTH,
        1 | 2 => {
            let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
            mean.round() as i64
        }
        n => {
            let recent = gaps[n - 1] as f64;
            let second = gaps[n - 2] as f64;
            let older = &gaps[..n - 2];
            let older_avg = older.iter().sum::<i64>() as f64 / older.len() as f64;
            (recent * 0.5 + second * 0.3 + older_avg * 0.2).round() as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlowIntensity;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Should parse date")
    }

    fn history(first: &str, gaps: &[i64]) -> Vec<CycleRecord> {
        let mut start = date(first);
        let mut records = Vec::new();
        let mut previous = None;
        loop {
            let record = CycleRecord::new(
                start,
                start + Duration::days(4),
                FlowIntensity::Moderate,
                previous,
            )
            .expect("Should create record");
            previous = Some(start);
            records.push(record);
            match gaps.get(records.len() - 1) {
                Some(&gap) => start = start + Duration::days(gap),
                None => break,
            }
        }
        records
    }

    #[test]
    fn test_empty_history_has_no_forecast() {
        let forecast = project(&[], date("2024-06-01")).expect("Should project");
        assert!(forecast.is_none());
    }

    #[test]
    fn test_weighted_average_weights_recent_cycles() {
        // 0.5*32 + 0.3*30 + 0.2*25 = 30
        assert_eq!(weighted_average(&[25, 30, 32]), 30);
        // One or two samples fall back to the arithmetic mean
        assert_eq!(weighted_average(&[26, 30]), 28);
        assert_eq!(weighted_average(&[31]), 31);
        assert_eq!(weighted_average(&[]), DEFAULT_CYCLE_LENGTH);
    }

    #[test]
    fn test_forecast_uses_weighted_average() {
        let records = history("2024-01-01", &[25, 30, 32]);
        let today = records.last().expect("Should have records").end_date + Duration::days(1);

        let forecast = project(&records, today)
            .expect("Should project")
            .expect("Should forecast");

        assert_eq!(forecast.avg_cycle_length, 30);
        assert_eq!(forecast.avg_duration, 5);
        assert_eq!(forecast.confidence, Confidence::High);
        assert_eq!(forecast.predictions.len(), 3);
    }

    #[test]
    fn test_predictions_never_precede_today() {
        // Last period ended long ago: early candidates land in the past
        let records = history("2024-01-01", &[28, 28]);
        let last_end = records.last().expect("Should have records").end_date;
        let today = last_end + Duration::days(70);

        let forecast = project(&records, today)
            .expect("Should project")
            .expect("Should forecast");

        assert!(!forecast.predictions.is_empty());
        for window in &forecast.predictions {
            assert!(window.start_date >= today);
        }
    }

    #[test]
    fn test_skipped_months_renumber_contiguously() {
        let records = history("2024-01-01", &[28, 28]);
        let last_end = records.last().expect("Should have records").end_date;
        let today = last_end + Duration::days(70);

        let forecast = project(&records, today)
            .expect("Should project")
            .expect("Should forecast");

        for (index, window) in forecast.predictions.iter().enumerate() {
            assert_eq!(window.month, index as u32 + 1);
        }
        assert!(forecast.predictions.len() < 3);
    }

    #[test]
    fn test_window_end_from_average_duration() {
        let records = history("2024-01-01", &[28, 28, 28]);
        let today = records.last().expect("Should have records").end_date + Duration::days(1);

        let forecast = project(&records, today)
            .expect("Should project")
            .expect("Should forecast");

        let window = &forecast.predictions[0];
        assert_eq!(
            window.end_date,
            window.start_date + Duration::days(forecast.avg_duration - 1)
        );
    }

    #[test]
    fn test_confidence_tiers() {
        let two = project(&history("2024-01-01", &[28, 28]), date("2024-04-01"))
            .expect("Should project")
            .expect("Should forecast");
        assert_eq!(two.confidence, Confidence::Medium);

        let one = project(&history("2024-01-01", &[28]), date("2024-03-01"))
            .expect("Should project")
            .expect("Should forecast");
        assert_eq!(one.confidence, Confidence::Low);
    }
}
