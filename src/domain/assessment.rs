//! Risk assessment result types.
//!
//! Represents the output of the composite PCOS risk scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk category for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Score below 25
    Low,
    /// Score in [25, 50)
    Moderate,
    /// Score of 50 or above
    High,
}

impl RiskCategory {
    /// Map a composite score to its category.
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        if score < 25 {
            Self::Low
        } else if score < 50 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable assessment summary.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => {
                "Your PCOS risk indicators are within normal ranges. Continue monitoring your cycle patterns."
            }
            Self::Moderate => {
                "Your cycle patterns show some irregularities. Track consistently and discuss with your healthcare provider if symptoms persist."
            }
            Self::High => {
                "Your cycle patterns and symptoms suggest PCOS risk factors. Schedule a consultation with a healthcare provider for proper evaluation."
            }
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
        }
    }
}

/// The five weighted factor contributions making up the composite score.
///
/// Each sub-score is independently capped and clamped to nonnegative:
/// cycle irregularity 0-40, symptom severity 0-25, BMI and weight 0-20,
/// hormonal indicators 0-10, family history 0 or 5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub cycle_irregularity: f64,
    pub symptom_severity: f64,
    pub bmi_and_weight: f64,
    pub hormonal_indicators: f64,
    pub family_history: f64,
}

impl FactorScores {
    /// Sum of all contributions before rounding.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cycle_irregularity
            + self.symptom_severity
            + self.bmi_and_weight
            + self.hormonal_indicators
            + self.family_history
    }

    /// Contributions ranked descending. Ties keep declaration order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&'static str, f64)> {
        let mut factors = vec![
            ("cycleIrregularity", self.cycle_irregularity),
            ("symptomSeverity", self.symptom_severity),
            ("bmiAndWeight", self.bmi_and_weight),
            ("hormonalIndicators", self.hormonal_indicators),
            ("familyHistory", self.family_history),
        ];
        factors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        factors
    }
}

/// One of the top contributing factors, with its rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopFactor {
    pub name: String,
    pub contribution: f64,
    pub explanation: String,
}

/// A single piece of threshold-gated advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub advice: String,
}

/// Priority of a lifestyle recommendation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// A lifestyle recommendation block (diet, exercise, sleep, tracking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBlock {
    pub category: String,
    pub priority: Priority,
    pub items: Vec<String>,
}

/// Human-readable explanation of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanations {
    /// Category-level summary message
    pub summary: String,

    /// Top three nonzero contributions, ranked descending
    pub top_factors: Vec<TopFactor>,

    pub recommendations: Vec<Recommendation>,

    pub action_items: Vec<String>,
}

/// How much data backed an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoints {
    pub cycles_tracked: usize,
    pub symptoms_logged: usize,
    pub metrics_provided: usize,
}

/// Complete risk assessment. Recomputed wholesale on each call; callers
/// replace any previously stored assessment with this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Composite score in [0, 100]
    pub risk_score: u32,

    pub risk_category: RiskCategory,

    pub contributions: FactorScores,

    pub explanations: Explanations,

    pub data_points: DataPoints,

    /// Timestamp of computation
    pub calculated_at: DateTime<Utc>,
}
