use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolType {
    Elementary,
    Middle,
    High,
    Private,
}

impl SchoolType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Elementary => "Elementary",
            Self::Middle => "Middle",
            Self::High => "High",
            Self::Private => "Private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub name: String,
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    pub distance_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableHome {
    pub address: String,
    pub price: u64,
    pub living_area_sqft: u64,
    pub beds: u32,
    pub baths: u32,
    pub price_per_sqft: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingClassification {
    Cheap,
    Moderate,
    Expensive,
}

impl PricingClassification {
    pub const CHEAP_BELOW: u64 = 100;
    pub const MODERATE_UP_TO: u64 = 300;

    /// Bounds are inclusive on the moderate band: 100 and 300 are both
    /// `Moderate`.
    pub const fn from_average(average_price_per_sqft: u64) -> Self {
        if average_price_per_sqft < Self::CHEAP_BELOW {
            Self::Cheap
        } else if average_price_per_sqft <= Self::MODERATE_UP_TO {
            Self::Moderate
        } else {
            Self::Expensive
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cheap => "Cheap",
            Self::Moderate => "Moderate",
            Self::Expensive => "Expensive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub average_price_per_sqft: u64,
    pub classification: PricingClassification,
}

/// View model handed to the schools list, comparable homes table and pricing
/// badge. Built once per successful lookup and replaced wholesale by the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodInsights {
    pub source_address: String,
    pub coordinates: Coordinates,
    pub school_district_name: String,
    pub schools: Vec<School>,
    pub comparable_homes: Vec<ComparableHome>,
    pub pricing: PricingSummary,
}
