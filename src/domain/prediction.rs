//! Cycle forecast types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast confidence, driven by how many valid gap samples exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// High with three or more samples, Medium with exactly two, Low below.
    #[must_use]
    pub fn from_samples(count: usize) -> Self {
        match count {
            n if n >= 3 => Self::High,
            2 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// One predicted period window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedWindow {
    /// Sequence number, contiguous from 1 even when earlier candidate
    /// months were discarded
    pub month: u32,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,
}

/// Forecast of the next period windows, anchored to the day it was
/// computed. Pure function of the history snapshot; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleForecast {
    /// Up to three upcoming windows, all on or after the anchor day
    pub predictions: Vec<PredictedWindow>,

    /// Weighted average cycle length in days
    pub avg_cycle_length: i64,

    /// Average bleed duration in days
    pub avg_duration: i64,

    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_from_samples() {
        assert_eq!(Confidence::from_samples(0), Confidence::Low);
        assert_eq!(Confidence::from_samples(1), Confidence::Low);
        assert_eq!(Confidence::from_samples(2), Confidence::Medium);
        assert_eq!(Confidence::from_samples(3), Confidence::High);
        assert_eq!(Confidence::from_samples(12), Confidence::High);
    }
}
