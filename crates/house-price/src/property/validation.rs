use std::fmt;

use serde::Serialize;

use super::domain::{current_year, Property, PropertyKind};

const MAX_ADDRESS_LEN: usize = 255;
const MAX_AREA_SQFT: f64 = 1_000_000.0;
const MAX_ROOMS: u32 = 20;
const EARLIEST_YEAR_BUILT: i32 = 1800;
const MAX_PRICE: f64 = 1_000_000_000.0;

/// Individual rule a property draft failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    InvalidAddress,
    InvalidArea,
    InvalidBedrooms,
    InvalidBathrooms,
    InvalidYearBuilt,
    InvalidPrice,
    /// Rent income or load capacity outside `0..=MAX_PRICE`.
    InvalidCategoryAttribute,
}

impl ValidationIssue {
    pub fn describe(self) -> &'static str {
        match self {
            ValidationIssue::InvalidAddress => "Invalid address",
            ValidationIssue::InvalidArea => "Invalid area",
            ValidationIssue::InvalidBedrooms => "Invalid bedrooms count",
            ValidationIssue::InvalidBathrooms => "Invalid bathrooms count",
            ValidationIssue::InvalidYearBuilt => "Invalid year built",
            ValidationIssue::InvalidPrice => "Invalid price",
            ValidationIssue::InvalidCategoryAttribute => "Invalid category attribute",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Every issue found in a single pass, so callers can report them together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("property failed validation: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Attribute bounds enforced before a property reaches persistence.
#[derive(Debug, Clone)]
pub struct PropertyValidator {
    reference_year: i32,
}

impl Default for PropertyValidator {
    fn default() -> Self {
        Self::new(current_year())
    }
}

impl PropertyValidator {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn is_valid_address(address: &str) -> bool {
        !address.trim().is_empty() && address.chars().count() <= MAX_ADDRESS_LEN
    }

    pub fn is_valid_area(area: f64) -> bool {
        area.is_finite() && area > 0.0 && area <= MAX_AREA_SQFT
    }

    pub fn is_valid_room_count(count: u32) -> bool {
        count <= MAX_ROOMS
    }

    pub fn is_valid_year_built(&self, year: i32) -> bool {
        (EARLIEST_YEAR_BUILT..=self.reference_year).contains(&year)
    }

    pub fn is_valid_price(price: f64) -> bool {
        price.is_finite() && (0.0..=MAX_PRICE).contains(&price)
    }

    /// Rent income and load capacity share the price bound.
    pub fn is_valid_category_attributes(kind: &PropertyKind) -> bool {
        match kind {
            PropertyKind::Residential { .. } => true,
            PropertyKind::Commercial { rent_income, .. } => Self::is_valid_price(*rent_income),
            PropertyKind::Industrial { load_capacity, .. } => Self::is_valid_price(*load_capacity),
        }
    }

    pub fn issues(&self, property: &Property) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !Self::is_valid_address(&property.address) {
            issues.push(ValidationIssue::InvalidAddress);
        }
        if !Self::is_valid_area(property.area) {
            issues.push(ValidationIssue::InvalidArea);
        }
        if !Self::is_valid_room_count(property.bedrooms) {
            issues.push(ValidationIssue::InvalidBedrooms);
        }
        if !Self::is_valid_room_count(property.bathrooms) {
            issues.push(ValidationIssue::InvalidBathrooms);
        }
        if !self.is_valid_year_built(property.year_built) {
            issues.push(ValidationIssue::InvalidYearBuilt);
        }
        if !Self::is_valid_category_attributes(&property.kind) {
            issues.push(ValidationIssue::InvalidCategoryAttribute);
        }

        issues
    }

    pub fn validate(&self, property: &Property) -> Result<(), ValidationError> {
        let issues = self.issues(property);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn validate_price(&self, price: f64) -> Result<(), ValidationError> {
        if Self::is_valid_price(price) {
            Ok(())
        } else {
            Err(ValidationError {
                issues: vec![ValidationIssue::InvalidPrice],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house() -> Property {
        Property::residential("12 Birch Court", 1650.0, 3, 2, 2001, 2, true, false)
    }

    #[test]
    fn accepts_well_formed_property() {
        let validator = PropertyValidator::new(2024);
        assert!(validator.validate(&house()).is_ok());
    }

    #[test]
    fn collects_every_issue() {
        let validator = PropertyValidator::new(2024);
        let mut property = house();
        property.address = "   ".to_string();
        property.area = 0.0;
        property.bedrooms = 21;
        property.year_built = 2030;

        let error = validator.validate(&property).expect_err("invalid draft");
        assert_eq!(
            error.issues,
            vec![
                ValidationIssue::InvalidAddress,
                ValidationIssue::InvalidArea,
                ValidationIssue::InvalidBedrooms,
                ValidationIssue::InvalidYearBuilt,
            ]
        );
        assert!(error.to_string().contains("Invalid bedrooms count"));
    }

    #[test]
    fn address_length_is_bounded() {
        assert!(PropertyValidator::is_valid_address(&"a".repeat(255)));
        assert!(!PropertyValidator::is_valid_address(&"a".repeat(256)));
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let validator = PropertyValidator::new(2024);
        assert!(validator.is_valid_year_built(1800));
        assert!(validator.is_valid_year_built(2024));
        assert!(!validator.is_valid_year_built(1799));
        assert!(!validator.is_valid_year_built(2025));
    }

    #[test]
    fn rejects_unbounded_rent_and_load() {
        let validator = PropertyValidator::new(2024);

        let inflated =
            Property::commercial("456 Business Ave", 5000.0, 0, 4, 2010, 1e308, true, 6);
        let error = validator.validate(&inflated).expect_err("rent overflows pricing");
        assert_eq!(error.issues, vec![ValidationIssue::InvalidCategoryAttribute]);

        let negative =
            Property::industrial("789 Factory Road", 10_000.0, 0, 2, 2005, -1e9, true, "M-2");
        assert!(validator.validate(&negative).is_err());

        let unknown_load =
            Property::industrial("789 Factory Road", 10_000.0, 0, 2, 2005, f64::NAN, true, "M-2");
        assert!(validator.validate(&unknown_load).is_err());

        let office = Property::commercial("456 Business Ave", 5000.0, 0, 4, 2010, 0.0, true, 6);
        assert!(validator.validate(&office).is_ok());
    }

    #[test]
    fn price_must_be_finite_and_bounded() {
        let validator = PropertyValidator::default();
        assert!(validator.validate_price(0.0).is_ok());
        assert!(validator.validate_price(-1.0).is_err());
        assert!(validator.validate_price(f64::NAN).is_err());
        assert!(validator.validate_price(2_000_000_000.0).is_err());
    }
}
