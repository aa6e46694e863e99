//! The three pricing strategies fanned out by the engine.
//!
//! Each strategy is a pure function of an immutable property snapshot and a reference year,
//! so it can run on any worker thread without coordination.

use std::sync::Arc;

use super::domain::{Algorithm, PredictionResult};
use crate::property::Property;

const LINEAR_REGRESSION_ADJUSTMENT: f64 = 1.05;
const MARKET_GROWTH_MULTIPLIER: f64 = 1.15;

const FEATURE_PRICE_PER_SQFT: f64 = 1200.0;
const FEATURE_BEDROOM_VALUE: f64 = 35_000.0;
const FEATURE_BATHROOM_VALUE: f64 = 15_000.0;
const FEATURE_AGE_PENALTY: f64 = 800.0;

/// A single pricing strategy. Implementations must not block or perform I/O.
pub trait PricingAlgorithm: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn estimate(&self, property: &Property, reference_year: i32) -> f64;

    fn predict(&self, property: &Property, reference_year: i32) -> PredictionResult {
        let price = self.estimate(property, reference_year).max(0.0);
        PredictionResult::new(property.id, price, self.algorithm())
    }
}

/// Category price with a flat regression adjustment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegression;

impl PricingAlgorithm for LinearRegression {
    fn algorithm(&self) -> Algorithm {
        Algorithm::LinearRegression
    }

    fn estimate(&self, property: &Property, reference_year: i32) -> f64 {
        property.calculate_price_as_of(reference_year) * LINEAR_REGRESSION_ADJUSTMENT
    }
}

/// Category-agnostic estimate from area, room counts, and age.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyFeatures;

impl PricingAlgorithm for PropertyFeatures {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PropertyFeatures
    }

    fn estimate(&self, property: &Property, reference_year: i32) -> f64 {
        property.area * FEATURE_PRICE_PER_SQFT
            + f64::from(property.bedrooms) * FEATURE_BEDROOM_VALUE
            + f64::from(property.bathrooms) * FEATURE_BATHROOM_VALUE
            - property.age_at(reference_year) * FEATURE_AGE_PENALTY
    }
}

/// Category price scaled by the market growth factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketAnalysis;

impl PricingAlgorithm for MarketAnalysis {
    fn algorithm(&self) -> Algorithm {
        Algorithm::MarketAnalysis
    }

    fn estimate(&self, property: &Property, reference_year: i32) -> f64 {
        property.calculate_price_as_of(reference_year) * MARKET_GROWTH_MULTIPLIER
    }
}

pub type AlgorithmSet = [Arc<dyn PricingAlgorithm>; 3];

pub fn standard_algorithms() -> AlgorithmSet {
    [
        Arc::new(LinearRegression),
        Arc::new(PropertyFeatures),
        Arc::new(MarketAnalysis),
    ]
}
