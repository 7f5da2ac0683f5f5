//! Property payload model and the pure transform into the insights view model.

pub mod payload;
pub mod transform;
pub mod views;

pub use payload::{RawAddress, RawNearbyHome, RawPropertyPayload, RawResoFacts, RawSchool};
pub use transform::{transform, MAX_COMPARABLE_HOMES};
pub use views::{
    ComparableHome, Coordinates, NeighborhoodInsights, PricingClassification, PricingSummary,
    School, SchoolType,
};
