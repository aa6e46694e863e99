use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::prediction::algorithms::{
    AlgorithmSet, LinearRegression, MarketAnalysis, PricingAlgorithm, PropertyFeatures,
};
use crate::prediction::domain::Algorithm;
use crate::prediction::engine::PricePredictionEngine;
use crate::property::{Property, PropertyId};

pub(super) const REFERENCE_YEAR: i32 = 2024;

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        worker_threads: 4,
        task_timeout: Duration::from_secs(5),
        shutdown_grace: Duration::from_secs(5),
        reference_year: Some(REFERENCE_YEAR),
    }
}

pub(super) fn engine() -> PricePredictionEngine {
    PricePredictionEngine::new(engine_config()).expect("engine starts")
}

pub(super) fn reference_house(id: u64) -> Property {
    Property::residential("123 Test St", 2000.0, 3, 2, 2015, 2, true, true)
        .with_id(PropertyId(id))
}

/// Market analysis that sleeps past any reasonable test deadline.
pub(super) struct StalledMarketAnalysis(pub Duration);

impl PricingAlgorithm for StalledMarketAnalysis {
    fn algorithm(&self) -> Algorithm {
        Algorithm::MarketAnalysis
    }

    fn estimate(&self, property: &Property, reference_year: i32) -> f64 {
        thread::sleep(self.0);
        MarketAnalysis.estimate(property, reference_year)
    }
}

/// Property features variant that faults on every call.
pub(super) struct FaultyPropertyFeatures;

impl PricingAlgorithm for FaultyPropertyFeatures {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PropertyFeatures
    }

    fn estimate(&self, _property: &Property, _reference_year: i32) -> f64 {
        panic!("feature store unavailable");
    }
}

pub(super) fn with_stalled_market(stall: Duration) -> AlgorithmSet {
    [
        Arc::new(LinearRegression),
        Arc::new(PropertyFeatures),
        Arc::new(StalledMarketAnalysis(stall)),
    ]
}

pub(super) fn with_faulty_features() -> AlgorithmSet {
    [
        Arc::new(LinearRegression),
        Arc::new(FaultyPropertyFeatures),
        Arc::new(MarketAnalysis),
    ]
}
