//! Insights service: the caller-facing façade over the engine.
//!
//! Orchestrates the pure computation modules with the storage port:
//! loads history snapshots, recomputes derived documents (assessment,
//! anomalies) with replace-on-write semantics, and routes red flags into
//! the alert ledger. The surrounding application's screens, auth, consent
//! and chat remain external collaborators.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::StorageError;
use crate::domain::{
    Alert, CycleForecast, CycleRecord, CycleStatistics, FlowIntensity, RecommendationBlock,
    RiskAssessment, RiskCategory, Severity, SymptomRecord, UserMetrics,
};
use crate::ports::UserStore;
use crate::{LunaraError, Result};

use super::{
    anomaly::{self, Detection},
    ensure_valid_history, ensure_valid_symptoms, forecast, scoring, AlertService, ANOMALIES_KEY,
    HEALTH_DATA_KEY, PCOS_RISK_KEY, SYMPTOMS_KEY, USER_DOCUMENT_KEYS,
};

/// Service exposing the engine's entry points for one storage backend.
pub struct InsightsService<S>
where
    S: UserStore,
{
    storage: Arc<S>,
    alerts: AlertService<S>,
}

impl<S> InsightsService<S>
where
    S: UserStore,
    S::Error: Into<StorageError>,
{
    /// Create a new insights service.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            alerts: AlertService::new(Arc::clone(&storage)),
            storage,
        }
    }

    /// The alert ledger operations (raise, dismiss, list).
    pub fn alerts(&self) -> &AlertService<S> {
        &self.alerts
    }

    /// Load and validate the user's cycle history.
    ///
    /// # Errors
    /// Returns error on storage failure or a malformed stored history.
    pub fn cycles(&self, user_id: &str) -> Result<Vec<CycleRecord>> {
        let cycles: Vec<CycleRecord> = self.load_array(HEALTH_DATA_KEY, user_id)?;
        ensure_valid_history(&cycles)?;
        Ok(cycles)
    }

    /// Load and validate the user's symptom log.
    ///
    /// # Errors
    /// Returns error on storage failure or malformed stored entries.
    pub fn symptoms(&self, user_id: &str) -> Result<Vec<SymptomRecord>> {
        let symptoms: Vec<SymptomRecord> = self.load_array(SYMPTOMS_KEY, user_id)?;
        ensure_valid_symptoms(&symptoms)?;
        Ok(symptoms)
    }

    /// Derive cycle statistics from the stored history.
    ///
    /// # Errors
    /// Returns error on storage failure or a malformed stored history.
    pub fn cycle_statistics(&self, user_id: &str) -> Result<CycleStatistics> {
        Ok(CycleStatistics::from_records(&self.cycles(user_id)?))
    }

    /// Recompute the risk assessment and persist it, replacing any previous
    /// one. A High category raises a `pcos_high_risk` alert.
    ///
    /// # Errors
    /// Returns error on invalid input or persistence failure.
    pub fn refresh_assessment(
        &self,
        user_id: &str,
        metrics: &UserMetrics,
    ) -> Result<RiskAssessment> {
        let cycles = self.cycles(user_id)?;
        let symptoms = self.symptoms(user_id)?;

        let assessment = scoring::assess(&cycles, &symptoms, metrics)?;
        self.store_doc(PCOS_RISK_KEY, user_id, &assessment)?;

        if assessment.risk_category == RiskCategory::High {
            let message = format!(
                "High PCOS risk: cycle patterns and symptoms suggest elevated risk (score {}/100). Review the recommendations and schedule a healthcare consultation for diagnostic evaluation.",
                assessment.risk_score
            );
            self.alerts
                .raise(user_id, Alert::new("pcos_high_risk", Severity::High, message))?;
        }

        Ok(assessment)
    }

    /// The stored assessment, if one has been computed.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub fn assessment(&self, user_id: &str) -> Result<Option<RiskAssessment>> {
        self.load_doc(PCOS_RISK_KEY, user_id)
    }

    /// Lifestyle recommendations for the stored assessment, or `None` when
    /// no assessment exists yet.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub fn lifestyle_plan(&self, user_id: &str) -> Result<Option<Vec<RecommendationBlock>>> {
        let Some(assessment) = self.assessment(user_id)? else {
            return Ok(None);
        };
        let cycles = self.cycles(user_id)?;
        Ok(Some(scoring::lifestyle_plan(&assessment, cycles.len())))
    }

    /// Rescan the history for anomalies and red flags. The stored anomaly
    /// set is replaced wholesale; red flags go through the alert ledger.
    ///
    /// # Errors
    /// Returns error on invalid input or persistence failure.
    pub fn refresh_anomalies(&self, user_id: &str) -> Result<Detection> {
        let cycles = self.cycles(user_id)?;
        let detection = anomaly::detect(&cycles)?;

        self.store_doc(ANOMALIES_KEY, user_id, &detection.anomalies)?;
        for flag in &detection.red_flags {
            self.alerts.raise(user_id, Alert::from_flag(flag))?;
        }

        Ok(detection)
    }

    /// Forecast the next period windows from the stored history.
    ///
    /// # Errors
    /// Returns error on storage failure or a malformed stored history.
    pub fn forecast(&self, user_id: &str) -> Result<Option<CycleForecast>> {
        forecast::project_now(&self.cycles(user_id)?)
    }

    /// Append a new cycle record and run the on-entry red-flag checks.
    ///
    /// # Errors
    /// Returns error if the record is malformed, breaks chronological
    /// order, or persistence fails.
    pub fn record_cycle(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        flow_intensity: FlowIntensity,
    ) -> Result<CycleRecord> {
        let mut cycles = self.cycles(user_id)?;

        if let Some(last) = cycles.last() {
            if start_date < last.start_date {
                return Err(LunaraError::Validation(format!(
                    "Cycle starting {start_date} predates the latest record ({})",
                    last.start_date
                )));
            }
        }

        let record = CycleRecord::new(
            start_date,
            end_date,
            flow_intensity,
            cycles.last().map(|c| c.start_date),
        )
        .map_err(LunaraError::Validation)?;

        cycles.push(record.clone());
        self.store_doc(HEALTH_DATA_KEY, user_id, &cycles)?;

        for flag in anomaly::entry_flags(&cycles) {
            self.alerts.raise(user_id, Alert::from_flag(&flag))?;
        }

        tracing::info!("Recorded cycle ({} day bleed)", record.duration);
        Ok(record)
    }

    /// Append a symptom log entry.
    ///
    /// # Errors
    /// Returns error if the entry is malformed or persistence fails.
    pub fn record_symptom(&self, user_id: &str, symptom: SymptomRecord) -> Result<()> {
        ensure_valid_symptoms(std::slice::from_ref(&symptom))?;

        let mut symptoms = self.symptoms(user_id)?;
        symptoms.push(symptom);
        self.store_doc(SYMPTOMS_KEY, user_id, &symptoms)
    }

    /// The stored anomaly set from the last detection run.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub fn anomalies(&self, user_id: &str) -> Result<Vec<crate::domain::Anomaly>> {
        self.load_array(ANOMALIES_KEY, user_id)
    }

    /// Delete every document this engine stores for the user.
    ///
    /// # Errors
    /// Returns error on storage failure.
    pub fn delete_user_data(&self, user_id: &str) -> Result<()> {
        for key in USER_DOCUMENT_KEYS {
            self.storage
                .delete(key, user_id)
                .map_err(|e| LunaraError::Storage(e.into()))?;
        }
        self.alerts.forget(user_id)?;

        tracing::warn!("Deleted all stored data for user");
        Ok(())
    }

    fn load_array<T: DeserializeOwned>(&self, key: &str, user_id: &str) -> Result<Vec<T>> {
        match self
            .storage
            .get(key, user_id)
            .map_err(|e| LunaraError::Storage(e.into()))?
        {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn load_doc<T: DeserializeOwned>(&self, key: &str, user_id: &str) -> Result<Option<T>> {
        match self
            .storage
            .get(key, user_id)
            .map_err(|e| LunaraError::Storage(e.into()))?
        {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn store_doc<T: Serialize>(&self, key: &str, user_id: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.storage
            .set(key, &json, user_id)
            .map_err(|e| LunaraError::Storage(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStore;
    use crate::domain::{Confidence, WeightTrend};
    use chrono::Duration;

    fn create_test_service() -> InsightsService<SqliteStore> {
        let storage = Arc::new(SqliteStore::in_memory().expect("Should create db"));
        InsightsService::new(storage)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Should parse date")
    }

    fn record(service: &InsightsService<SqliteStore>, start: &str, duration: i64, flow: FlowIntensity) {
        let start_date = date(start);
        service
            .record_cycle(
                "u1",
                start_date,
                start_date + Duration::days(duration - 1),
                flow,
            )
            .expect("Should record cycle");
    }

    #[test]
    fn test_cycle_append_preserves_order() {
        let service = create_test_service();
        record(&service, "2024-03-01", 5, FlowIntensity::Moderate);

        let result = service.record_cycle(
            "u1",
            date("2024-02-01"),
            date("2024-02-05"),
            FlowIntensity::Moderate,
        );
        assert!(matches!(result, Err(LunaraError::Validation(_))));

        let cycles = service.cycles("u1").expect("Should load");
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn test_hundred_day_gap_raises_amenorrhea_alert() {
        let service = create_test_service();
        record(&service, "2024-01-01", 5, FlowIntensity::Moderate);
        record(&service, "2024-04-10", 5, FlowIntensity::Moderate);

        let alerts = service.alerts().active("u1").expect("Should list");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "amenorrhea");
        assert_eq!(alerts[0].severity, Severity::High);
        assert!(alerts[0].message.contains("100 days"));
    }

    #[test]
    fn test_heavy_long_bleed_raises_menorrhagia_alert() {
        let service = create_test_service();
        record(&service, "2024-03-01", 8, FlowIntensity::Heavy);

        let alerts = service.alerts().active("u1").expect("Should list");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "menorrhagia");
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn test_assessment_is_persisted_and_replaced() {
        let service = create_test_service();
        record(&service, "2024-03-01", 5, FlowIntensity::Moderate);

        let metrics = UserMetrics {
            bmi: Some(32.0),
            ..Default::default()
        };
        let first = service
            .refresh_assessment("u1", &metrics)
            .expect("Should assess");
        assert!((first.contributions.bmi_and_weight - 15.0).abs() < f64::EPSILON);

        let stored = service
            .assessment("u1")
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(stored.risk_score, first.risk_score);

        // Recomputing with different metrics replaces the document
        let second = service
            .refresh_assessment("u1", &UserMetrics::default())
            .expect("Should assess");
        let stored = service
            .assessment("u1")
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(stored.risk_score, second.risk_score);
        assert_ne!(first.risk_score, second.risk_score);
    }

    #[test]
    fn test_high_risk_raises_alert() {
        let service = create_test_service();
        record(&service, "2024-03-01", 5, FlowIntensity::Moderate);

        let mut symptom =
            SymptomRecord::new(date("2024-03-02"), 10).expect("Should create record");
        symptom.acne = true;
        symptom.fatigue = true;
        symptom.mood_swings = true;
        symptom.bloating = true;
        service.record_symptom("u1", symptom).expect("Should record");

        let metrics = UserMetrics {
            bmi: Some(40.0),
            hirsutism: 10,
            acne_severity: 4,
            weight_trend: WeightTrend::Increasing,
            family_history: true,
        };
        let assessment = service
            .refresh_assessment("u1", &metrics)
            .expect("Should assess");
        assert_eq!(assessment.risk_category, RiskCategory::High);

        let alerts = service.alerts().active("u1").expect("Should list");
        assert!(alerts.iter().any(|a| a.alert_type == "pcos_high_risk"));

        // Recomputing does not duplicate the alert
        service
            .refresh_assessment("u1", &metrics)
            .expect("Should assess");
        let alerts = service.alerts().active("u1").expect("Should list");
        assert_eq!(
            alerts
                .iter()
                .filter(|a| a.alert_type == "pcos_high_risk")
                .count(),
            1
        );
    }

    #[test]
    fn test_anomaly_refresh_replaces_and_deduplicates() {
        let service = create_test_service();
        record(&service, "2024-01-01", 5, FlowIntensity::Moderate);
        record(&service, "2024-01-29", 5, FlowIntensity::Moderate);
        record(&service, "2024-02-28", 5, FlowIntensity::Moderate);
        record(&service, "2024-06-07", 5, FlowIntensity::Moderate);

        let first = service.refresh_anomalies("u1").expect("Should detect");
        assert!(first
            .red_flags
            .iter()
            .any(|f| f.flag_type == "AMENORRHEA"));

        // Second run: identical detection, stored set replaced not merged,
        // ledger unchanged
        let second = service.refresh_anomalies("u1").expect("Should detect");
        assert_eq!(first, second);

        let stored = service.anomalies("u1").expect("Should load");
        assert_eq!(stored, second.anomalies);

        let amenorrhea_alerts = service
            .alerts()
            .active("u1")
            .expect("Should list")
            .into_iter()
            .filter(|a| a.alert_type == "AMENORRHEA")
            .count();
        assert_eq!(amenorrhea_alerts, 1);
    }

    #[test]
    fn test_forecast_from_stored_history() {
        let service = create_test_service();
        record(&service, "2024-01-01", 5, FlowIntensity::Moderate);
        record(&service, "2024-01-26", 5, FlowIntensity::Moderate);
        record(&service, "2024-02-25", 5, FlowIntensity::Moderate);
        record(&service, "2024-03-28", 5, FlowIntensity::Moderate);

        let forecast = service
            .forecast("u1")
            .expect("Should project")
            .expect("Should forecast");

        // Gaps 25, 30, 32 weighted: 0.5*32 + 0.3*30 + 0.2*25 = 30
        assert_eq!(forecast.avg_cycle_length, 30);
        assert_eq!(forecast.confidence, Confidence::High);
    }

    #[test]
    fn test_lifestyle_plan_requires_assessment() {
        let service = create_test_service();
        record(&service, "2024-03-01", 5, FlowIntensity::Moderate);

        assert!(service.lifestyle_plan("u1").expect("Should load").is_none());

        service
            .refresh_assessment("u1", &UserMetrics::default())
            .expect("Should assess");
        let plan = service
            .lifestyle_plan("u1")
            .expect("Should load")
            .expect("Should exist");
        assert!(plan.iter().any(|b| b.category == "Diet"));
    }

    #[test]
    fn test_delete_user_data_clears_everything() {
        let service = create_test_service();
        record(&service, "2024-03-01", 8, FlowIntensity::Heavy);
        service
            .refresh_assessment("u1", &UserMetrics::default())
            .expect("Should assess");

        service.delete_user_data("u1").expect("Should delete");

        assert!(service.cycles("u1").expect("Should load").is_empty());
        assert!(service.assessment("u1").expect("Should load").is_none());
        assert!(service.alerts().active("u1").expect("Should list").is_empty());
    }
}
