//! Property records, validation, persistence ports, and the HTTP surface built on them.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    current_year, Property, PropertyCategory, PropertyId, PropertyKind, PropertyStatus,
    UnknownCategory,
};
pub use repository::{
    PredictionRepository, PriceStatistics, PropertyRepository, PropertyView, RepositoryError,
};
pub use router::property_router;
pub use service::{PropertyService, PropertyServiceError};
pub use validation::{PropertyValidator, ValidationError, ValidationIssue};
