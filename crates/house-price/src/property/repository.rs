use serde::Serialize;

use super::domain::{Property, PropertyId};
use crate::prediction::{PredictionId, PredictionResult};

/// Storage abstraction for property records. Implementations assign ids on insert.
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn update(&self, property: Property) -> Result<(), RepositoryError>;
    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn list(&self) -> Result<Vec<Property>, RepositoryError>;
    fn delete(&self, id: PropertyId) -> Result<(), RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
}

/// Storage abstraction for persisted predictions.
pub trait PredictionRepository: Send + Sync {
    fn insert(&self, result: PredictionResult) -> Result<PredictionResult, RepositoryError>;
    fn update(&self, result: PredictionResult) -> Result<(), RepositoryError>;
    fn fetch(&self, id: PredictionId) -> Result<Option<PredictionResult>, RepositoryError>;
    fn for_property(&self, property_id: PropertyId)
        -> Result<Vec<PredictionResult>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound representation of a property alongside its category price estimate.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyView {
    #[serde(flatten)]
    pub property: Property,
    pub estimated_price: f64,
}

impl PropertyView {
    pub fn new(property: Property, reference_year: i32) -> Self {
        let estimated_price = property.calculate_price_as_of(reference_year);
        Self {
            property,
            estimated_price,
        }
    }
}

/// Portfolio-wide price figures derived from each property's category estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub total_properties: usize,
    pub total_value: f64,
    pub average_price: f64,
    pub highest_price: f64,
}

impl PriceStatistics {
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Self {
        let (count, total, highest) = prices
            .into_iter()
            .fold((0usize, 0.0f64, 0.0f64), |(count, total, highest), price| {
                (count + 1, total + price, highest.max(price))
            });

        Self {
            total_properties: count,
            total_value: total,
            average_price: if count == 0 { 0.0 } else { total / count as f64 },
            highest_price: highest,
        }
    }
}
