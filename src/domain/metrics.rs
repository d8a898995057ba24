//! User health metrics supplied per assessment call.
//!
//! Unlike cycle and symptom records these are not historized; the caller
//! passes the current values with each scoring request.

use serde::{Deserialize, Serialize};

/// Self-reported weight trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightTrend {
    Increasing,
    #[default]
    Stable,
    Decreasing,
}

/// Optional health metrics that refine the risk assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMetrics {
    /// Body mass index in kg/m²
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,

    /// Hirsutism severity on a 0-10 scale
    pub hirsutism: u8,

    /// Acne severity on a 0-4 scale
    pub acne_severity: u8,

    pub weight_trend: WeightTrend,

    /// Family history of PCOS
    pub family_history: bool,
}

impl UserMetrics {
    /// Validate that all metrics are within expected ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(bmi) = self.bmi {
            if !bmi.is_finite() || !(10.0..=100.0).contains(&bmi) {
                errors.push(format!("BMI {bmi} out of range [10, 100]"));
            }
        }
        if self.hirsutism > 10 {
            errors.push(format!("Hirsutism {} out of range [0, 10]", self.hirsutism));
        }
        if self.acne_severity > 4 {
            errors.push(format!(
                "Acne severity {} out of range [0, 4]",
                self.acne_severity
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Number of meaningfully provided fields, reported alongside the
    /// assessment so the caller can show how much data backed it.
    #[must_use]
    pub fn provided_count(&self) -> usize {
        usize::from(self.bmi.is_some())
            + usize::from(self.hirsutism > 0)
            + usize::from(self.acne_severity > 0)
            + usize::from(self.weight_trend != WeightTrend::Stable)
            + usize::from(self.family_history)
    }
}
