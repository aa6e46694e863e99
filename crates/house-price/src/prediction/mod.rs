//! Concurrent multi-algorithm price prediction.
//!
//! [`PricePredictionEngine`] dispatches the three [`algorithms`] to a fixed [`pool`] of worker
//! threads, joins them against a per-task deadline, and records successful result sets in a
//! shared [`cache`].

pub mod algorithms;
pub mod cache;
pub mod domain;
pub mod engine;
pub mod pool;

#[cfg(test)]
mod tests;

pub use algorithms::{
    standard_algorithms, AlgorithmSet, LinearRegression, MarketAnalysis, PricingAlgorithm,
    PropertyFeatures,
};
pub use cache::PredictionCache;
pub use domain::{Algorithm, PredictionId, PredictionResult, PredictionStatus};
pub use engine::{EngineState, PredictionError, PricePredictionEngine};
pub use pool::{PoolClosed, ShutdownOutcome, WorkerPool};
