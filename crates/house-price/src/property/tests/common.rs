use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::prediction::{PredictionId, PredictionResult, PricePredictionEngine};
use crate::property::repository::{PredictionRepository, PropertyRepository, RepositoryError};
use crate::property::{property_router, Property, PropertyId, PropertyService};

pub(super) const REFERENCE_YEAR: i32 = 2024;

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        worker_threads: 3,
        task_timeout: Duration::from_secs(5),
        shutdown_grace: Duration::from_secs(5),
        reference_year: Some(REFERENCE_YEAR),
    }
}

pub(super) fn engine() -> Arc<PricePredictionEngine> {
    Arc::new(PricePredictionEngine::new(engine_config()).expect("engine starts"))
}

pub(super) fn house() -> Property {
    Property::residential("123 Oak Street", 2000.0, 3, 2, 2015, 2, true, true)
}

pub(super) fn office() -> Property {
    Property::commercial("456 Business Ave", 5000.0, 0, 4, 2010, 5000.0, true, 6)
}

pub(super) fn warehouse() -> Property {
    Property::industrial("789 Factory Road", 10_000.0, 0, 2, 2005, 500.0, true, "M-2")
}

pub(super) type MemoryService = PropertyService<MemoryProperties, MemoryPredictions>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryProperties>,
    Arc<MemoryPredictions>,
) {
    let properties = Arc::new(MemoryProperties::default());
    let predictions = Arc::new(MemoryPredictions::default());
    let service = PropertyService::new(properties.clone(), predictions.clone(), engine());
    (service, properties, predictions)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    property_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryProperties {
    records: Mutex<BTreeMap<PropertyId, Property>>,
    sequence: AtomicU64,
}

impl PropertyRepository for MemoryProperties {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let id = PropertyId(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = property.with_id(id);
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(id, stored.clone());
        Ok(stored)
    }

    fn update(&self, property: Property) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&property.id) {
            Some(existing) => {
                *existing = property;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: PropertyId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").len())
    }
}

#[derive(Default)]
pub(super) struct MemoryPredictions {
    records: Mutex<Vec<PredictionResult>>,
    sequence: AtomicU64,
}

impl MemoryPredictions {
    pub(super) fn all(&self) -> Vec<PredictionResult> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl PredictionRepository for MemoryPredictions {
    fn insert(&self, result: PredictionResult) -> Result<PredictionResult, RepositoryError> {
        let id = PredictionId(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = result.with_id(id);
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    fn update(&self, result: PredictionResult) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let existing = guard
            .iter_mut()
            .find(|stored| stored.prediction_id == result.prediction_id)
            .ok_or(RepositoryError::NotFound)?;
        *existing = result;
        Ok(())
    }

    fn fetch(&self, id: PredictionId) -> Result<Option<PredictionResult>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| stored.prediction_id == id).cloned())
    }

    fn for_property(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<PredictionResult>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|stored| stored.property_id == property_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableProperties;

impl PropertyRepository for UnavailableProperties {
    fn insert(&self, _property: Property) -> Result<Property, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _property: Property) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: PropertyId) -> Result<Option<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: PropertyId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
