use std::sync::Arc;

use tracing::info;

use super::domain::{Property, PropertyCategory, PropertyId};
use super::repository::{
    PredictionRepository, PriceStatistics, PropertyRepository, PropertyView, RepositoryError,
};
use super::validation::{PropertyValidator, ValidationError};
use crate::prediction::{PredictionError, PredictionId, PredictionResult, PricePredictionEngine};

/// Service composing validation, persistence, and the prediction engine.
pub struct PropertyService<P, R> {
    properties: Arc<P>,
    predictions: Arc<R>,
    engine: Arc<PricePredictionEngine>,
}

impl<P, R> PropertyService<P, R>
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    pub fn new(properties: Arc<P>, predictions: Arc<R>, engine: Arc<PricePredictionEngine>) -> Self {
        Self {
            properties,
            predictions,
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<PricePredictionEngine> {
        &self.engine
    }

    /// Validator bounded by the engine's reference year at the time of the call.
    fn validator(&self) -> PropertyValidator {
        PropertyValidator::new(self.engine.reference_year())
    }

    pub fn view(&self, property: Property) -> PropertyView {
        PropertyView::new(property, self.engine.reference_year())
    }

    /// Validate and persist a new property; the repository assigns its id.
    pub fn add_property(&self, property: Property) -> Result<Property, PropertyServiceError> {
        self.validator().validate(&property)?;
        let stored = self
            .properties
            .insert(property.with_id(PropertyId::UNSAVED))?;
        info!(property_id = %stored.id, category = %stored.category(), "property added");
        Ok(stored)
    }

    pub fn get_property(&self, id: PropertyId) -> Result<Property, PropertyServiceError> {
        let property = self.properties.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(property)
    }

    pub fn list_properties(&self) -> Result<Vec<Property>, PropertyServiceError> {
        Ok(self.properties.list()?)
    }

    pub fn properties_by_category(
        &self,
        category: PropertyCategory,
    ) -> Result<Vec<Property>, PropertyServiceError> {
        Ok(self
            .properties
            .list()?
            .into_iter()
            .filter(|property| property.category() == category)
            .collect())
    }

    /// Replace every attribute of an existing property.
    pub fn update_property(
        &self,
        id: PropertyId,
        property: Property,
    ) -> Result<Property, PropertyServiceError> {
        self.validator().validate(&property)?;
        let property = property.with_id(id);
        self.properties.update(property.clone())?;
        Ok(property)
    }

    pub fn delete_property(&self, id: PropertyId) -> Result<(), PropertyServiceError> {
        self.properties.delete(id)?;
        info!(property_id = %id, "property deleted");
        Ok(())
    }

    pub fn total_properties(&self) -> Result<usize, PropertyServiceError> {
        Ok(self.properties.count()?)
    }

    pub fn average_estimated_price(&self) -> Result<f64, PropertyServiceError> {
        Ok(self.price_statistics()?.average_price)
    }

    pub fn price_statistics(&self) -> Result<PriceStatistics, PropertyServiceError> {
        let reference_year = self.engine.reference_year();
        let properties = self.properties.list()?;
        Ok(PriceStatistics::from_prices(
            properties
                .iter()
                .map(|property| property.calculate_price_as_of(reference_year)),
        ))
    }

    /// Run the engine for a stored property and persist every result it returns.
    ///
    /// Blocks until the engine joins all algorithms; call from a blocking context.
    pub fn predict(&self, id: PropertyId) -> Result<Vec<PredictionResult>, PropertyServiceError> {
        let property = self.get_property(id)?;
        let results = self.engine.predict(&property)?;
        let saved = results
            .into_iter()
            .map(|result| self.predictions.insert(result))
            .collect::<Result<Vec<_>, _>>()?;
        info!(property_id = %id, predictions = saved.len(), "predictions stored");
        Ok(saved)
    }

    pub fn prediction_results(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<PredictionResult>, PropertyServiceError> {
        Ok(self.predictions.for_property(property_id)?)
    }

    pub fn save_prediction_result(
        &self,
        result: PredictionResult,
    ) -> Result<PredictionResult, PropertyServiceError> {
        Ok(self.predictions.insert(result)?)
    }

    /// Attach the realised sale price to a persisted prediction.
    pub fn record_actual_price(
        &self,
        id: PredictionId,
        actual_price: f64,
    ) -> Result<PredictionResult, PropertyServiceError> {
        self.validator().validate_price(actual_price)?;
        let stored = self.predictions.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let verified = stored.verified(actual_price);
        self.predictions.update(verified.clone())?;
        Ok(verified)
    }

    pub fn cached_predictions(&self, property_id: PropertyId) -> Vec<PredictionResult> {
        self.engine.cached_predictions(property_id)
    }

    pub fn clear_prediction_cache(&self) {
        self.engine.clear_cache();
    }
}

/// Error raised by the property service.
#[derive(Debug, thiserror::Error)]
pub enum PropertyServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
