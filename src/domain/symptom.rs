//! Symptom log entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_id;

/// One day's symptom log. Independent of cycle records; many entries may
/// share a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    /// Unique identifier
    pub id: String,

    /// Day the symptoms were observed
    pub date: NaiveDate,

    /// Menstrual pain on a 0-10 scale
    pub pain_score: u8,

    pub acne: bool,
    pub fatigue: bool,
    pub mood_swings: bool,
    pub bloating: bool,
}

impl SymptomRecord {
    /// Create a new entry with all symptom flags cleared.
    ///
    /// # Errors
    /// Returns error if `pain_score` exceeds 10.
    pub fn new(date: NaiveDate, pain_score: u8) -> Result<Self, String> {
        if pain_score > 10 {
            return Err(format!("Pain score {pain_score} out of range [0, 10]"));
        }

        Ok(Self {
            id: new_id(),
            date,
            pain_score,
            acne: false,
            fatigue: false,
            mood_swings: false,
            bloating: false,
        })
    }
}

/// Validate a stored symptom log.
///
/// # Errors
/// Returns validation errors as a vector of strings.
pub fn validate_log(records: &[SymptomRecord]) -> Result<(), Vec<String>> {
    let errors: Vec<String> = records
        .iter()
        .filter(|r| r.pain_score > 10)
        .map(|r| format!("Record {}: pain score {} out of range [0, 10]", r.id, r.pain_score))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_pain_out_of_range() {
        let date = "2024-03-01".parse().expect("Should parse date");
        assert!(SymptomRecord::new(date, 10).is_ok());
        assert!(SymptomRecord::new(date, 11).is_err());
    }

    #[test]
    fn test_log_validation() {
        let date = "2024-03-01".parse().expect("Should parse date");
        let mut record = SymptomRecord::new(date, 4).expect("Should create record");
        assert!(validate_log(&[record.clone()]).is_ok());

        record.pain_score = 200;
        assert!(validate_log(&[record]).is_err());
    }
}
