use std::sync::{Mutex, MutexGuard, PoisonError};

use super::domain::PredictionResult;
use crate::property::PropertyId;

/// Process-local log of every successful prediction, in call order.
///
/// Grows without bound until [`PredictionCache::clear`] is called.
#[derive(Debug, Default)]
pub struct PredictionCache {
    entries: Mutex<Vec<PredictionResult>>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the vector consistent, so a poisoned lock is still usable.
    fn entries(&self) -> MutexGuard<'_, Vec<PredictionResult>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a whole result set under one lock acquisition.
    pub fn append_all(&self, results: &[PredictionResult]) {
        self.entries().extend_from_slice(results);
    }

    pub fn for_property(&self, property_id: PropertyId) -> Vec<PredictionResult> {
        self.entries()
            .iter()
            .filter(|result| result.property_id == property_id)
            .cloned()
            .collect()
    }

    /// Empties the cache and reports how many entries were dropped.
    pub fn clear(&self) -> usize {
        let mut guard = self.entries();
        let dropped = guard.len();
        guard.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
