//! Anomalies, red flags, and the deduplicated alert ledger.
//!
//! Anomalies are ephemeral: each detection run replaces the previous set.
//! Red flags become persistent alerts, and the ledger enforces at most one
//! active alert per distinct type string.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

/// Severity of an anomaly or alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Kind of cycle-pattern anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    ExtendedCycle,
    ShortCycle,
}

/// A deviation from the user's own cycle pattern, shown in the insights
/// view but never persisted as an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,

    pub severity: Severity,

    /// The gap that triggered the anomaly, in days
    pub days: i64,

    pub message: String,
}

/// A detected condition that warrants a persistent alert.
///
/// The type is a free string: the detection path emits uppercase types
/// (`AMENORRHEA`) while the on-entry checks emit lowercase ones
/// (`amenorrhea`), and ledger deduplication matches exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    #[serde(rename = "type")]
    pub flag_type: String,

    pub severity: Severity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,

    pub message: String,
}

/// A persistent user alert. Lives until dismissed by id or the account is
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier
    pub id: String,

    #[serde(rename = "type")]
    pub alert_type: String,

    pub severity: Severity,

    pub message: String,

    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert raised now.
    #[must_use]
    pub fn new(alert_type: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            alert_type: alert_type.into(),
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Promote a red flag into a persistent alert.
    #[must_use]
    pub fn from_flag(flag: &RedFlag) -> Self {
        Self::new(flag.flag_type.clone(), flag.severity, flag.message.clone())
    }
}

/// The deduplicated set of active alerts, keyed by exact type string.
///
/// Insertion is idempotent per type; removal is by id only. The ledger
/// itself is not synchronized; concurrent callers go through
/// `application::AlertService`, which serializes mutations per user.
#[derive(Debug, Clone, Default)]
pub struct AlertLedger {
    by_type: BTreeMap<String, Alert>,
}

impl AlertLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a stored alert list. When a type appears more
    /// than once the earliest entry wins, so loading converges to the
    /// at-most-one-per-type invariant.
    #[must_use]
    pub fn from_alerts(alerts: Vec<Alert>) -> Self {
        let mut ledger = Self::new();
        for alert in alerts {
            ledger.add(alert);
        }
        ledger
    }

    /// Insert an alert unless one of the same type is already active.
    /// Returns whether the alert was stored.
    pub fn add(&mut self, alert: Alert) -> bool {
        if self.by_type.contains_key(&alert.alert_type) {
            return false;
        }
        self.by_type.insert(alert.alert_type.clone(), alert);
        true
    }

    /// Remove the alert with the given id, if present. Returns whether an
    /// alert was removed.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let key = self
            .by_type
            .iter()
            .find(|(_, alert)| alert.id == id)
            .map(|(key, _)| key.clone());

        match key {
            Some(key) => {
                self.by_type.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Whether an alert of this exact type is active.
    #[must_use]
    pub fn contains_type(&self, alert_type: &str) -> bool {
        self.by_type.contains_key(alert_type)
    }

    /// Snapshot of the active alerts, ordered by type.
    #[must_use]
    pub fn list(&self) -> Vec<Alert> {
        self.by_type.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(alert_type: &str) -> Alert {
        Alert::new(alert_type, Severity::Medium, "test message")
    }

    #[test]
    fn test_duplicate_type_is_noop() {
        let mut ledger = AlertLedger::new();
        assert!(ledger.add(alert("menorrhagia")));
        assert!(!ledger.add(alert("menorrhagia")));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_type_match_is_exact() {
        // Uppercase and lowercase spellings are distinct types
        let mut ledger = AlertLedger::new();
        assert!(ledger.add(alert("AMENORRHEA")));
        assert!(ledger.add(alert("amenorrhea")));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_dismiss_removes_exactly_one_by_id() {
        let mut ledger = AlertLedger::new();
        let first = alert("amenorrhea");
        let first_id = first.id.clone();
        ledger.add(first);
        ledger.add(alert("menorrhagia"));

        assert!(ledger.dismiss(&first_id));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.contains_type("amenorrhea"));

        // Dismissing an unknown id changes nothing
        assert!(!ledger.dismiss(&first_id));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_from_alerts_converges_duplicates() {
        let a = alert("pcos_high_risk");
        let kept_id = a.id.clone();
        let ledger = AlertLedger::from_alerts(vec![a, alert("pcos_high_risk")]);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.list()[0].id, kept_id);
    }
}
