//! Cycle pattern anomaly and red-flag detection.
//!
//! Two paths exist, mirroring how users encounter them:
//! - [`detect`] scans the whole history against the user's own average and
//!   needs at least two valid gap samples to know what "normal" is.
//! - [`entry_flags`] runs on every saved cycle with no minimum-sample
//!   guard, so severe conditions surface even in sparse histories.
//!
//! Detection results replace any previously stored anomaly set; red flags
//! are handed to the alert ledger for deduplicated insertion.

use serde::Serialize;

use crate::domain::{
    Anomaly, AnomalyKind, CycleRecord, CycleStatistics, FlowIntensity, RedFlag, Severity,
};
use crate::Result;

use super::ensure_valid_history;

/// Result of one detection run over an unchanged history; running it again
/// yields an identical value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub anomalies: Vec<Anomaly>,
    pub red_flags: Vec<RedFlag>,
}

/// Scan consecutive cycle gaps and flow records for anomalies and red
/// flags. Rules are evaluated independently; all applicable ones fire.
///
/// # Errors
/// Returns `LunaraError::Validation` when the history is malformed.
pub fn detect(cycles: &[CycleRecord]) -> Result<Detection> {
    ensure_valid_history(cycles)?;

    let mut detection = Detection::default();
    if cycles.len() < 2 {
        return Ok(detection);
    }

    let stats = CycleStatistics::from_records(cycles);
    if stats.sample_count() < 2 {
        tracing::debug!(
            "Skipping anomaly scan: {} valid gap samples",
            stats.sample_count()
        );
        return Ok(detection);
    }
    let avg = stats.mean_gap_or_default();

    for pair in cycles.windows(2) {
        let days = (pair[1].start_date - pair[0].start_date).num_days();

        // Amenorrhea: missing period for 90+ days
        if days > 90 {
            detection.red_flags.push(RedFlag {
                flag_type: "AMENORRHEA".to_string(),
                severity: Severity::High,
                days: Some(days),
                message: format!("No menstruation for {days} days. Medical evaluation needed."),
            });
        }

        // Extended cycle: significantly longer than the user's average
        if days as f64 > avg * 1.5 && days < 90 {
            detection.anomalies.push(Anomaly {
                kind: AnomalyKind::ExtendedCycle,
                severity: Severity::Medium,
                days,
                message: format!(
                    "Cycle longer than your average ({days} vs {}). Monitor pattern.",
                    avg.round()
                ),
            });
        }

        // Short cycle: significantly shorter than the user's average
        if (days as f64) < avg * 0.5 && days >= 20 {
            detection.anomalies.push(Anomaly {
                kind: AnomalyKind::ShortCycle,
                severity: Severity::Medium,
                days,
                message: format!(
                    "Cycle shorter than your average ({days} vs {}). May indicate anovulation.",
                    avg.round()
                ),
            });
        }
    }

    // Menorrhagia: any heavy cycle bleeding beyond 7 days, flagged once
    let heavy = cycles
        .iter()
        .any(|c| c.flow_intensity == FlowIntensity::Heavy && c.duration > 7);
    if heavy {
        detection.red_flags.push(RedFlag {
            flag_type: "MENORRHAGIA".to_string(),
            severity: Severity::Medium,
            days: None,
            message: "Heavy menstrual bleeding lasting >7 days. Consult healthcare provider."
                .to_string(),
        });
    }

    tracing::info!(
        "Anomaly scan complete: {} anomalies, {} red flags",
        detection.anomalies.len(),
        detection.red_flags.len()
    );

    Ok(detection)
}

/// Red-flag checks run when a cycle is saved. Unlike [`detect`], these have
/// no minimum-sample requirement and use the lowercase alert types.
#[must_use]
pub fn entry_flags(cycles: &[CycleRecord]) -> Vec<RedFlag> {
    let mut flags = Vec::new();

    let Some(latest) = cycles.last() else {
        return flags;
    };

    // Heavy bleeding beyond 7 days on the record just entered
    if latest.duration > 7 && latest.flow_intensity == FlowIntensity::Heavy {
        flags.push(RedFlag {
            flag_type: "menorrhagia".to_string(),
            severity: Severity::Medium,
            days: None,
            message: "Heavy menstrual bleeding lasting more than 7 days detected. Consider scheduling a consultation with your healthcare provider to rule out anemia or other conditions.".to_string(),
        });
    }

    for pair in cycles.windows(2) {
        let days = (pair[1].start_date - pair[0].start_date).num_days();
        if days > 90 {
            flags.push(RedFlag {
                flag_type: "amenorrhea".to_string(),
                severity: Severity::High,
                days: Some(days),
                message: format!(
                    "Amenorrhea detected: {days} days without menstruation. This requires prompt medical evaluation. Please consult your healthcare provider."
                ),
            });
        }
    }

    flags
}
