use super::payload::{RawAddress, RawNearbyHome, RawPropertyPayload, RawResoFacts, RawSchool};
use super::views::{
    ComparableHome, Coordinates, NeighborhoodInsights, PricingClassification, PricingSummary,
    School, SchoolType,
};

pub const MAX_COMPARABLE_HOMES: usize = 10;
pub const SINGLE_FAMILY: &str = "SINGLE_FAMILY";
pub const UNKNOWN_DISTRICT: &str = "Unknown District";
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
pub const UNKNOWN_SCHOOL: &str = "Unknown School";
pub const DISTANCE_NOT_AVAILABLE: &str = "N/A";

/// Reshapes a provider payload into the view model. Total: sparse or
/// malformed fields fall back to their documented defaults.
pub fn transform(raw: &RawPropertyPayload, queried_address: &str) -> NeighborhoodInsights {
    let schools = raw.schools.iter().map(normalize_school).collect();

    let comparable_homes: Vec<ComparableHome> = raw
        .nearby_homes
        .iter()
        .filter_map(comparable_home)
        .take(MAX_COMPARABLE_HOMES)
        .collect();

    let average_price_per_sqft = average_price_per_sqft(&comparable_homes);

    NeighborhoodInsights {
        source_address: queried_address.to_string(),
        coordinates: Coordinates {
            lat: raw.latitude.unwrap_or(0.0),
            lng: raw.longitude.unwrap_or(0.0),
        },
        school_district_name: school_district(raw.reso_facts.as_ref()),
        schools,
        comparable_homes,
        pricing: PricingSummary {
            average_price_per_sqft,
            classification: PricingClassification::from_average(average_price_per_sqft),
        },
    }
}

/// `Private` wins over level; unrecognized levels (e.g. "K-8") fall back to
/// `Elementary`.
pub fn classify_school(kind: Option<&str>, level: Option<&str>) -> SchoolType {
    if kind == Some("Private") {
        return SchoolType::Private;
    }

    let level = level.unwrap_or_default().to_lowercase();
    if level.contains("elementary") {
        SchoolType::Elementary
    } else if level.contains("middle") || level.contains("junior") {
        SchoolType::Middle
    } else if level.contains("high") {
        SchoolType::High
    } else {
        SchoolType::Elementary
    }
}

/// A zero distance is how the provider reports an unknown one.
pub fn distance_label(distance: Option<f64>) -> String {
    match distance.filter(|value| value.is_finite() && *value != 0.0) {
        Some(miles) => format!("{miles} miles"),
        None => DISTANCE_NOT_AVAILABLE.to_string(),
    }
}

pub fn format_address(address: Option<&RawAddress>) -> String {
    let parts: Vec<&str> = address
        .map(|address| {
            [
                address.street_address.as_deref(),
                address.city.as_deref(),
                address.state.as_deref(),
                address.zipcode.as_deref(),
            ]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        ADDRESS_NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

pub fn school_district(facts: Option<&RawResoFacts>) -> String {
    facts
        .and_then(|facts| {
            [
                facts.high_school_district.as_deref(),
                facts.middle_or_junior_school_district.as_deref(),
                facts.elementary_school_district.as_deref(),
            ]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|district| !district.is_empty())
        })
        .unwrap_or(UNKNOWN_DISTRICT)
        .to_string()
}

fn normalize_school(raw: &RawSchool) -> School {
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_SCHOOL);

    School {
        name: name.to_string(),
        school_type: classify_school(raw.kind.as_deref(), raw.level.as_deref()),
        distance_label: distance_label(raw.distance),
        rating: raw
            .rating
            .filter(|rating| rating.is_finite() && *rating > 0.0 && *rating <= 10.0),
        address: String::new(),
    }
}

/// `livingAreaValue` is preferred; a zero or missing value falls back to
/// `livingArea`.
fn living_area(raw: &RawNearbyHome) -> Option<f64> {
    raw.living_area_value
        .filter(|sqft| *sqft > 0.0)
        .or(raw.living_area)
        .filter(|sqft| *sqft > 0.0)
}

fn comparable_home(raw: &RawNearbyHome) -> Option<ComparableHome> {
    if raw.home_type.as_deref() != Some(SINGLE_FAMILY) {
        return None;
    }
    let sqft = living_area(raw)?;
    let price = raw.price.filter(|price| *price > 0.0)?;

    Some(ComparableHome {
        address: format_address(raw.address.as_ref()),
        price: price.round() as u64,
        living_area_sqft: sqft.round() as u64,
        beds: whole_count(raw.bedrooms),
        baths: whole_count(raw.bathrooms),
        price_per_sqft: (price / sqft).round() as u64,
    })
}

fn whole_count(value: Option<f64>) -> u32 {
    value
        .filter(|count| count.is_finite() && *count > 0.0)
        .map(|count| count.round() as u32)
        .unwrap_or(0)
}

fn average_price_per_sqft(homes: &[ComparableHome]) -> u64 {
    if homes.is_empty() {
        return 0;
    }
    let total: u128 = homes
        .iter()
        .map(|home| u128::from(home.price_per_sqft))
        .sum();
    (total as f64 / homes.len() as f64).round() as u64
}
