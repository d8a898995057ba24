//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external dependencies.
//! All types are serializable and implement strict validation.

mod alert;
mod assessment;
mod cycle;
mod id;
mod metrics;
mod prediction;
mod stats;
mod symptom;

pub(crate) use id::new_id;

pub use alert::{Alert, AlertLedger, Anomaly, AnomalyKind, RedFlag, Severity};
pub use assessment::{
    DataPoints, Explanations, FactorScores, Priority, Recommendation, RecommendationBlock,
    RiskAssessment, RiskCategory, TopFactor,
};
pub use cycle::{validate_history, CycleRecord, FlowIntensity, DEFAULT_CYCLE_LENGTH};
pub use metrics::{UserMetrics, WeightTrend};
pub use prediction::{Confidence, CycleForecast, PredictedWindow};
pub use stats::{CycleStatistics, DEFAULT_BLEED_DURATION, VALID_GAP_MAX, VALID_GAP_MIN};
pub use symptom::{validate_log, SymptomRecord};
