//! Alert service: serialized, persistent alert ledger mutations.
//!
//! The ledger is the one piece of shared mutable state in the engine.
//! "Check for a same-type alert, then append" must not interleave between
//! concurrent callers, so every mutation runs under a single mutex and the
//! updated document is persisted before the in-memory state commits. A
//! failed persistence write therefore surfaces as a storage error while
//! memory and store still agree.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::adapters::StorageError;
use crate::domain::{Alert, AlertLedger};
use crate::ports::UserStore;
use crate::{LunaraError, Result};

use super::ALERTS_KEY;

/// Service mediating idempotent alert insertion and removal, per user.
pub struct AlertService<S>
where
    S: UserStore,
{
    storage: Arc<S>,
    ledgers: Mutex<HashMap<String, AlertLedger>>,
}

impl<S> AlertService<S>
where
    S: UserStore,
    S::Error: Into<StorageError>,
{
    /// Create a new alert service.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Raise an alert unless one of the same type is already active.
    ///
    /// Returns whether the alert was stored.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be loaded or persisted.
    pub fn raise(&self, user_id: &str, alert: Alert) -> Result<bool> {
        let mut ledgers = self.lock_ledgers()?;
        let ledger = Self::hydrate(&self.storage, &mut ledgers, user_id)?;

        if ledger.contains_type(&alert.alert_type) {
            tracing::debug!("Alert of type {} already active, skipping", alert.alert_type);
            return Ok(false);
        }

        let alert_type = alert.alert_type.clone();
        let mut updated = ledger.clone();
        updated.add(alert);

        self.persist(user_id, &updated)?;
        ledgers.insert(user_id.to_string(), updated);

        tracing::info!("Raised {} alert", alert_type);
        Ok(true)
    }

    /// Dismiss the alert with the given id.
    ///
    /// Returns whether an alert was removed.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be loaded or persisted.
    pub fn dismiss(&self, user_id: &str, alert_id: &str) -> Result<bool> {
        let mut ledgers = self.lock_ledgers()?;
        let ledger = Self::hydrate(&self.storage, &mut ledgers, user_id)?;

        let mut updated = ledger.clone();
        if !updated.dismiss(alert_id) {
            return Ok(false);
        }

        self.persist(user_id, &updated)?;
        ledgers.insert(user_id.to_string(), updated);

        tracing::info!("Dismissed alert");
        Ok(true)
    }

    /// Snapshot of the user's active alerts.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be loaded.
    pub fn active(&self, user_id: &str) -> Result<Vec<Alert>> {
        let mut ledgers = self.lock_ledgers()?;
        let ledger = Self::hydrate(&self.storage, &mut ledgers, user_id)?;
        Ok(ledger.list())
    }

    /// Drop the cached ledger for a user whose data was deleted.
    pub(crate) fn forget(&self, user_id: &str) -> Result<()> {
        let mut ledgers = self.lock_ledgers()?;
        ledgers.remove(user_id);
        Ok(())
    }

    fn lock_ledgers(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, AlertLedger>>> {
        self.ledgers
            .lock()
            .map_err(|_| LunaraError::Ledger("ledger lock poisoned".to_string()))
    }

    /// Load the user's ledger from storage on first access.
    fn hydrate<'a>(
        storage: &Arc<S>,
        ledgers: &'a mut HashMap<String, AlertLedger>,
        user_id: &str,
    ) -> Result<&'a AlertLedger> {
        match ledgers.entry(user_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let stored: Vec<Alert> = match storage
                    .get(ALERTS_KEY, user_id)
                    .map_err(|e| LunaraError::Storage(e.into()))?
                {
                    Some(json) => serde_json::from_str(&json)?,
                    None => Vec::new(),
                };
                Ok(entry.insert(AlertLedger::from_alerts(stored)))
            }
        }
    }

    fn persist(&self, user_id: &str, ledger: &AlertLedger) -> Result<()> {
        let json = serde_json::to_string(&ledger.list())?;
        self.storage
            .set(ALERTS_KEY, &json, user_id)
            .map_err(|e| LunaraError::Storage(e.into()))
    }
}
