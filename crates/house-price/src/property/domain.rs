use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the persistence layer; `PropertyId::UNSAVED` until first insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

impl PropertyId {
    pub const UNSAVED: PropertyId = PropertyId(0);

    pub fn is_unsaved(self) -> bool {
        self == Self::UNSAVED
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag for the three priced property categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Industrial,
}

impl PropertyCategory {
    pub const ALL: [PropertyCategory; 3] = [
        PropertyCategory::Residential,
        PropertyCategory::Commercial,
        PropertyCategory::Industrial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PropertyCategory::Residential => "RESIDENTIAL",
            PropertyCategory::Commercial => "COMMERCIAL",
            PropertyCategory::Industrial => "INDUSTRIAL",
        }
    }
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for PropertyCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            "industrial" => Ok(Self::Industrial),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Listing status carried alongside the property record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    #[default]
    Active,
    Inactive,
}

/// Category-specific attributes. Each variant owns its own pricing formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    Residential {
        floors: u32,
        has_garage: bool,
        has_garden: bool,
    },
    Commercial {
        /// Monthly rent roll.
        rent_income: f64,
        has_parking: bool,
        max_floors: u32,
    },
    Industrial {
        load_capacity: f64,
        has_loading_dock: bool,
        zone_type: String,
    },
}

impl PropertyKind {
    pub fn category(&self) -> PropertyCategory {
        match self {
            PropertyKind::Residential { .. } => PropertyCategory::Residential,
            PropertyKind::Commercial { .. } => PropertyCategory::Commercial,
            PropertyKind::Industrial { .. } => PropertyCategory::Industrial,
        }
    }
}

const RESIDENTIAL_PRICE_PER_SQFT: f64 = 1500.0;
const RESIDENTIAL_BEDROOM_PREMIUM: f64 = 50_000.0;
const RESIDENTIAL_GARAGE_PREMIUM: f64 = 20_000.0;
const RESIDENTIAL_GARDEN_PREMIUM: f64 = 15_000.0;
const RESIDENTIAL_AGE_DISCOUNT: f64 = 1000.0;
const RESIDENTIAL_FLOOR_PRICE: f64 = 50_000.0;

const COMMERCIAL_PRICE_PER_SQFT: f64 = 2000.0;
const COMMERCIAL_ANNUAL_RENT_MULTIPLE: f64 = 8.0;
const COMMERCIAL_PARKING_PREMIUM: f64 = 50_000.0;
const COMMERCIAL_AGE_DISCOUNT: f64 = 500.0;
const COMMERCIAL_FLOOR_PRICE: f64 = 100_000.0;

const INDUSTRIAL_PRICE_PER_SQFT: f64 = 800.0;
const INDUSTRIAL_LOAD_PREMIUM: f64 = 100.0;
const INDUSTRIAL_DOCK_PREMIUM: f64 = 75_000.0;
const INDUSTRIAL_AGE_DISCOUNT: f64 = 800.0;
const INDUSTRIAL_FLOOR_PRICE: f64 = 50_000.0;

/// Current calendar year, used when no explicit reference year is configured.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// A priced property record. Cloned into an immutable snapshot for every prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub id: PropertyId,
    pub address: String,
    /// Living or floor area in square feet.
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub year_built: i32,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

impl Property {
    pub fn new(
        address: impl Into<String>,
        area: f64,
        bedrooms: u32,
        bathrooms: u32,
        year_built: i32,
        kind: PropertyKind,
    ) -> Self {
        Self {
            id: PropertyId::UNSAVED,
            address: address.into(),
            area,
            bedrooms,
            bathrooms,
            year_built,
            status: PropertyStatus::Active,
            kind,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn residential(
        address: impl Into<String>,
        area: f64,
        bedrooms: u32,
        bathrooms: u32,
        year_built: i32,
        floors: u32,
        has_garage: bool,
        has_garden: bool,
    ) -> Self {
        Self::new(
            address,
            area,
            bedrooms,
            bathrooms,
            year_built,
            PropertyKind::Residential {
                floors,
                has_garage,
                has_garden,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn commercial(
        address: impl Into<String>,
        area: f64,
        bedrooms: u32,
        bathrooms: u32,
        year_built: i32,
        rent_income: f64,
        has_parking: bool,
        max_floors: u32,
    ) -> Self {
        Self::new(
            address,
            area,
            bedrooms,
            bathrooms,
            year_built,
            PropertyKind::Commercial {
                rent_income,
                has_parking,
                max_floors,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn industrial(
        address: impl Into<String>,
        area: f64,
        bedrooms: u32,
        bathrooms: u32,
        year_built: i32,
        load_capacity: f64,
        has_loading_dock: bool,
        zone_type: impl Into<String>,
    ) -> Self {
        Self::new(
            address,
            area,
            bedrooms,
            bathrooms,
            year_built,
            PropertyKind::Industrial {
                load_capacity,
                has_loading_dock,
                zone_type: zone_type.into(),
            },
        )
    }

    pub fn with_id(mut self, id: PropertyId) -> Self {
        self.id = id;
        self
    }

    pub fn category(&self) -> PropertyCategory {
        self.kind.category()
    }

    /// Whole years between construction and `reference_year`. Negative for future builds.
    pub fn age_at(&self, reference_year: i32) -> f64 {
        f64::from(reference_year - self.year_built)
    }

    /// Category price estimate depreciated against the current calendar year.
    pub fn calculate_price(&self) -> f64 {
        self.calculate_price_as_of(current_year())
    }

    /// Category price estimate depreciated against `reference_year`, clamped to the category floor.
    pub fn calculate_price_as_of(&self, reference_year: i32) -> f64 {
        let age = self.age_at(reference_year);
        match &self.kind {
            PropertyKind::Residential {
                has_garage,
                has_garden,
                ..
            } => {
                let estimate = self.area * RESIDENTIAL_PRICE_PER_SQFT
                    + f64::from(self.bedrooms) * RESIDENTIAL_BEDROOM_PREMIUM
                    + premium(*has_garage, RESIDENTIAL_GARAGE_PREMIUM)
                    + premium(*has_garden, RESIDENTIAL_GARDEN_PREMIUM)
                    - age * RESIDENTIAL_AGE_DISCOUNT;
                estimate.max(RESIDENTIAL_FLOOR_PRICE)
            }
            PropertyKind::Commercial {
                rent_income,
                has_parking,
                ..
            } => {
                let annual_rent = rent_income * 12.0;
                let estimate = self.area * COMMERCIAL_PRICE_PER_SQFT
                    + annual_rent * COMMERCIAL_ANNUAL_RENT_MULTIPLE
                    + premium(*has_parking, COMMERCIAL_PARKING_PREMIUM)
                    - age * COMMERCIAL_AGE_DISCOUNT;
                estimate.max(COMMERCIAL_FLOOR_PRICE)
            }
            PropertyKind::Industrial {
                load_capacity,
                has_loading_dock,
                ..
            } => {
                let estimate = self.area * INDUSTRIAL_PRICE_PER_SQFT
                    + load_capacity * INDUSTRIAL_LOAD_PREMIUM
                    + premium(*has_loading_dock, INDUSTRIAL_DOCK_PREMIUM)
                    - age * INDUSTRIAL_AGE_DISCOUNT;
                estimate.max(INDUSTRIAL_FLOOR_PRICE)
            }
        }
    }
}

fn premium(present: bool, amount: f64) -> f64 {
    if present {
        amount
    } else {
        0.0
    }
}
