use house_price::prediction::{PredictionId, PredictionResult};
use house_price::property::{
    PredictionRepository, Property, PropertyCategory, PropertyId, PropertyRepository,
    RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    records: Arc<Mutex<BTreeMap<PropertyId, Property>>>,
    sequence: Arc<AtomicU64>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let id = PropertyId(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = property.with_id(id);
        guard(&self.records)?.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&self, property: Property) -> Result<(), RepositoryError> {
        let mut records = guard(&self.records)?;
        match records.get_mut(&property.id) {
            Some(existing) => {
                *existing = property;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(guard(&self.records)?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        Ok(guard(&self.records)?.values().cloned().collect())
    }

    fn delete(&self, id: PropertyId) -> Result<(), RepositoryError> {
        guard(&self.records)?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(guard(&self.records)?.len())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPredictionRepository {
    records: Arc<Mutex<Vec<PredictionResult>>>,
    sequence: Arc<AtomicU64>,
}

impl PredictionRepository for InMemoryPredictionRepository {
    fn insert(&self, result: PredictionResult) -> Result<PredictionResult, RepositoryError> {
        let id = PredictionId(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = result.with_id(id);
        guard(&self.records)?.push(stored.clone());
        Ok(stored)
    }

    fn update(&self, result: PredictionResult) -> Result<(), RepositoryError> {
        let mut records = guard(&self.records)?;
        let existing = records
            .iter_mut()
            .find(|stored| stored.prediction_id == result.prediction_id)
            .ok_or(RepositoryError::NotFound)?;
        *existing = result;
        Ok(())
    }

    fn fetch(&self, id: PredictionId) -> Result<Option<PredictionResult>, RepositoryError> {
        Ok(guard(&self.records)?
            .iter()
            .find(|stored| stored.prediction_id == id)
            .cloned())
    }

    fn for_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<PredictionResult>, RepositoryError> {
        Ok(guard(&self.records)?
            .iter()
            .filter(|stored| stored.property_id == property_id)
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_category(raw: &str) -> Result<PropertyCategory, String> {
    raw.parse::<PropertyCategory>().map_err(|err| {
        format!("{err} (expected residential, commercial, or industrial)")
    })
}
