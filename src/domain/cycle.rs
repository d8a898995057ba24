//! Menstrual cycle records.
//!
//! A record captures one bleed: start date, end date, flow intensity, and
//! the derived duration and cycle length. Records are immutable once stored
//! and ordered by start date ascending; the last element is "current".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_id;

/// Cycle length assumed when no previous cycle exists or the computed
/// length is implausible.
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Self-reported flow intensity for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntensity {
    Light,
    #[default]
    Moderate,
    Heavy,
}

impl std::fmt::Display for FlowIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Moderate => write!(f, "moderate"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// One recorded menstrual cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    /// Unique identifier
    pub id: String,

    /// First day of bleeding
    pub start_date: NaiveDate,

    /// Last day of bleeding
    pub end_date: NaiveDate,

    /// Self-reported flow intensity
    pub flow_intensity: FlowIntensity,

    /// Bleed length in days, start to end inclusive
    pub duration: i64,

    /// Days since the previous cycle started; 28 when unavailable or
    /// outside [20, 45]
    pub cycle_length: i64,
}

impl CycleRecord {
    /// Create a new record, deriving duration and cycle length.
    ///
    /// # Errors
    /// Returns error if `end_date` is before `start_date`.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        flow_intensity: FlowIntensity,
        previous_start: Option<NaiveDate>,
    ) -> Result<Self, String> {
        if end_date < start_date {
            return Err(format!(
                "End date {end_date} is before start date {start_date}"
            ));
        }

        let duration = (end_date - start_date).num_days() + 1;

        let cycle_length = match previous_start {
            Some(prev) => {
                let days = (start_date - prev).num_days();
                if (20..=45).contains(&days) {
                    days
                } else {
                    DEFAULT_CYCLE_LENGTH
                }
            }
            None => DEFAULT_CYCLE_LENGTH,
        };

        Ok(Self {
            id: new_id(),
            start_date,
            end_date,
            flow_intensity,
            duration,
            cycle_length,
        })
    }
}

/// Validate a stored cycle history before any derivation runs.
///
/// Scoring, detection and forecasting all assume well-formed days-between
/// arithmetic, so malformed histories are rejected here instead of being
/// coerced downstream.
///
/// # Errors
/// Returns validation errors as a vector of strings.
pub fn validate_history(records: &[CycleRecord]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for record in records {
        if record.end_date < record.start_date {
            errors.push(format!(
                "Record {}: end date {} before start date {}",
                record.id, record.end_date, record.start_date
            ));
        }
        if record.duration <= 0 {
            errors.push(format!(
                "Record {}: duration {} must be positive",
                record.id, record.duration
            ));
        }
    }

    for pair in records.windows(2) {
        if pair[1].start_date < pair[0].start_date {
            errors.push(format!(
                "Records out of chronological order: {} starts before {}",
                pair[1].start_date, pair[0].start_date
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Should parse date")
    }

    #[test]
    fn test_duration_is_inclusive() {
        let record = CycleRecord::new(
            date("2024-03-01"),
            date("2024-03-05"),
            FlowIntensity::Moderate,
            None,
        )
        .expect("Should create record");

        assert_eq!(record.duration, 5);
        assert_eq!(record.cycle_length, DEFAULT_CYCLE_LENGTH);
    }

    #[test]
    fn test_cycle_length_from_previous_start() {
        let record = CycleRecord::new(
            date("2024-03-30"),
            date("2024-04-03"),
            FlowIntensity::Light,
            Some(date("2024-03-01")),
        )
        .expect("Should create record");

        assert_eq!(record.cycle_length, 29);
    }

    #[test]
    fn test_implausible_cycle_length_defaults() {
        // 100-day gap is outside [20, 45]
        let record = CycleRecord::new(
            date("2024-06-09"),
            date("2024-06-13"),
            FlowIntensity::Moderate,
            Some(date("2024-03-01")),
        )
        .expect("Should create record");

        assert_eq!(record.cycle_length, DEFAULT_CYCLE_LENGTH);
    }

    #[test]
    fn test_rejects_end_before_start() {
        let result = CycleRecord::new(
            date("2024-03-05"),
            date("2024-03-01"),
            FlowIntensity::Moderate,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_history_validation_rejects_disorder() {
        let a = CycleRecord::new(date("2024-04-01"), date("2024-04-05"), FlowIntensity::Moderate, None)
            .expect("Should create record");
        let b = CycleRecord::new(date("2024-03-01"), date("2024-03-05"), FlowIntensity::Moderate, None)
            .expect("Should create record");

        assert!(validate_history(&[b.clone(), a.clone()]).is_ok());
        assert!(validate_history(&[a, b]).is_err());
    }
}
