//! Per-driver mutual exclusion for the load, plan and save sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::PlanError;

/// Hands out one mutex per driver.
///
/// Planning for different drivers proceeds in parallel; two calls for the
/// same driver queue on that driver's mutex so the second one loads the
/// hours the first one saved. Entries no caller still holds are dropped
/// on the next lookup, so the table tracks only drivers in flight.
#[derive(Debug, Default)]
pub struct DriverLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DriverLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex guarding `driver`'s hours, created on first use.
    ///
    /// Callers keep the returned handle for the whole load, plan and save
    /// sequence; an entry whose only reference is the table is pruned.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::LockPoisoned`] if a thread panicked while holding
    /// the table.
    pub fn lock_for(&self, driver: &str) -> Result<Arc<Mutex<()>>, PlanError> {
        let mut locks = self.locks.lock().map_err(|_| PlanError::LockPoisoned {
            driver: driver.to_owned(),
        })?;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(Arc::clone(locks.entry(driver.to_owned()).or_default()))
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}
