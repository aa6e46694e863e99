use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::property::PropertyId;

/// Identifier assigned when a prediction is persisted; zero while it only lives in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionId(pub u64);

impl PredictionId {
    pub const UNSAVED: PredictionId = PredictionId(0);
}

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of pricing strategies run for every prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    LinearRegression,
    PropertyFeatures,
    MarketAnalysis,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::LinearRegression,
        Algorithm::PropertyFeatures,
        Algorithm::MarketAnalysis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::LinearRegression => "LINEAR_REGRESSION",
            Algorithm::PropertyFeatures => "PROPERTY_FEATURES",
            Algorithm::MarketAnalysis => "MARKET_ANALYSIS",
        }
    }

    /// Published accuracy for the strategy. A constant, not measured against actual prices.
    pub fn accuracy(self) -> f64 {
        match self {
            Algorithm::LinearRegression => 92.5,
            Algorithm::PropertyFeatures => 88.3,
            Algorithm::MarketAnalysis => 85.7,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionStatus {
    #[default]
    Pending,
    /// An actual sale price has been recorded against the prediction.
    Verified,
}

impl PredictionStatus {
    pub fn label(self) -> &'static str {
        match self {
            PredictionStatus::Pending => "PENDING",
            PredictionStatus::Verified => "VERIFIED",
        }
    }
}

/// One algorithm's estimate for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction_id: PredictionId,
    pub property_id: PropertyId,
    pub predicted_price: f64,
    pub actual_price: f64,
    pub accuracy: f64,
    pub algorithm: Algorithm,
    pub prediction_date: DateTime<Utc>,
    pub status: PredictionStatus,
}

impl PredictionResult {
    pub fn new(property_id: PropertyId, predicted_price: f64, algorithm: Algorithm) -> Self {
        Self {
            prediction_id: PredictionId::UNSAVED,
            property_id,
            predicted_price,
            actual_price: 0.0,
            accuracy: algorithm.accuracy(),
            algorithm,
            prediction_date: Utc::now(),
            status: PredictionStatus::Pending,
        }
    }

    pub fn with_id(mut self, prediction_id: PredictionId) -> Self {
        self.prediction_id = prediction_id;
        self
    }

    /// Attach ground truth once the property has actually sold.
    pub fn verified(mut self, actual_price: f64) -> Self {
        self.actual_price = actual_price;
        self.status = PredictionStatus::Verified;
        self
    }

    /// Signed difference between the estimate and the recorded sale price, once verified.
    pub fn error(&self) -> Option<f64> {
        match self.status {
            PredictionStatus::Verified => Some(self.predicted_price - self.actual_price),
            PredictionStatus::Pending => None,
        }
    }
}
