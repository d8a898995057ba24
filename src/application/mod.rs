//! Application layer: Use cases and services.
//!
//! The computation modules (`scoring`, `anomaly`, `forecast`) are pure,
//! synchronous functions over immutable history snapshots. The stateful
//! services (`AlertService`, `InsightsService`) orchestrate them with the
//! storage port.

pub mod anomaly;
pub mod forecast;
pub mod scoring;

mod alerts;
mod insights;

pub use alerts::AlertService;
pub use insights::InsightsService;

/// Document keys used by the surrounding application for per-user storage.
pub const HEALTH_DATA_KEY: &str = "healthData";
pub const SYMPTOMS_KEY: &str = "symptoms";
pub const PCOS_RISK_KEY: &str = "pcosRisk";
pub const ANOMALIES_KEY: &str = "anomalies";
pub const ALERTS_KEY: &str = "alerts";

/// All document keys owned by this engine, in deletion order.
pub const USER_DOCUMENT_KEYS: [&str; 5] = [
    HEALTH_DATA_KEY,
    SYMPTOMS_KEY,
    PCOS_RISK_KEY,
    ANOMALIES_KEY,
    ALERTS_KEY,
];

use crate::domain::{CycleRecord, SymptomRecord, UserMetrics};
use crate::{LunaraError, Result};

/// Reject malformed cycle histories before any derivation runs.
pub(crate) fn ensure_valid_history(cycles: &[CycleRecord]) -> Result<()> {
    crate::domain::validate_history(cycles)
        .map_err(|errors| LunaraError::Validation(errors.join("; ")))
}

pub(crate) fn ensure_valid_symptoms(symptoms: &[SymptomRecord]) -> Result<()> {
    crate::domain::validate_log(symptoms)
        .map_err(|errors| LunaraError::Validation(errors.join("; ")))
}

pub(crate) fn ensure_valid_metrics(metrics: &UserMetrics) -> Result<()> {
    metrics
        .validate()
        .map_err(|errors| LunaraError::Validation(errors.join("; ")))
}
