use crate::infra::live_services;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use neighborhood_insights::autocomplete::{AddressInputController, SuggestionPhase};
use neighborhood_insights::config::AppConfig;
use neighborhood_insights::error::AppError;
use neighborhood_insights::insights::{ComparableHome, NeighborhoodInsights};
use neighborhood_insights::providers::{ProviderError, ProviderKind, SuggestionProvider};
use neighborhood_insights::view::{InsightsView, GENERIC_FETCH_ERROR};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const HOMES_CSV_HEADER: [&str; 6] = [
    "address",
    "price",
    "living_area_sqft",
    "beds",
    "baths",
    "price_per_sqft",
];

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Full street address to look up
    pub(crate) address: String,
    /// Write the comparable homes to this CSV file
    #[arg(long)]
    pub(crate) homes_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    /// Partial address, as typed into the address field
    pub(crate) partial: String,
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let LookupArgs { address, homes_csv } = args;
    let config = AppConfig::load()?;
    let services = live_services(&config)?;

    let view = InsightsView::new(Arc::new(services.property));
    if !view.submit_address(address) {
        return Err(AppError::Validation(
            "Address parameter is required".to_string(),
        ));
    }

    let state = view.settled().await;
    if let Some(error) = state.error {
        return Err(AppError::Lookup(error));
    }
    let Some(insights) = state.insights else {
        return Err(AppError::Lookup(GENERIC_FETCH_ERROR.to_string()));
    };

    render_insights(&insights, state.updated_at);

    if let Some(path) = homes_csv {
        let file = File::create(&path)?;
        write_homes_csv(file, &insights.comparable_homes)?;
        println!(
            "\nWrote {} comparable homes to {}",
            insights.comparable_homes.len(),
            path.display()
        );
    }

    Ok(())
}

pub(crate) async fn run_suggest(args: SuggestArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    if config.providers.places_api_key.is_none() {
        return Err(AppError::Provider(ProviderError::ConfigMissing {
            provider: ProviderKind::Places,
        }));
    }

    let services = live_services(&config)?;
    let provider: Arc<dyn SuggestionProvider> = Arc::new(services.suggestions);
    let controller = AddressInputController::from_config(provider, &config.query);

    controller.input_changed(args.partial.as_str());
    let mut snapshots = controller.subscribe();
    let deadline = config.query.debounce + config.providers.request_timeout + Duration::from_secs(1);
    let snapshot = match tokio::time::timeout(
        deadline,
        snapshots.wait_for(|snapshot| snapshot.phase != SuggestionPhase::Pending),
    )
    .await
    {
        Ok(Ok(snapshot)) => snapshot.clone(),
        _ => controller.snapshot(),
    };

    if snapshot.visible().is_empty() {
        if args.partial.trim().chars().count() < config.query.min_suggestion_chars {
            println!(
                "Type at least {} characters to get suggestions",
                config.query.min_suggestion_chars
            );
        } else {
            println!("No suggestions for '{}'", args.partial.trim());
        }
        return Ok(());
    }

    println!("Suggestions for '{}'", args.partial.trim());
    for (index, suggestion) in snapshot.visible().iter().enumerate() {
        println!("{:>2}. {}", index + 1, suggestion.description);
    }
    Ok(())
}

fn render_insights(insights: &NeighborhoodInsights, updated_at: Option<DateTime<Utc>>) {
    println!("Neighborhood insights for {}", insights.source_address);
    println!(
        "- Location: {:.4}, {:.4}",
        insights.coordinates.lat, insights.coordinates.lng
    );
    println!("- School district: {}", insights.school_district_name);
    if let Some(updated_at) = updated_at {
        println!(
            "- Updated: {}",
            updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    println!("\nSchools ({})", insights.schools.len());
    if insights.schools.is_empty() {
        println!("  No school data available");
    }
    for school in &insights.schools {
        let rating = school
            .rating
            .map(|rating| format!("{rating}/10"))
            .unwrap_or_else(|| "unrated".to_string());
        println!(
            "  - {} [{}] {} | {}",
            school.name,
            school.school_type.label(),
            school.distance_label,
            rating
        );
    }

    println!("\nComparable homes ({})", insights.comparable_homes.len());
    if insights.comparable_homes.is_empty() {
        println!("  No comparable single-family homes nearby");
    }
    for home in &insights.comparable_homes {
        println!(
            "  - {} | ${} | {} sqft | {} bd / {} ba | ${}/sqft",
            home.address,
            home.price,
            home.living_area_sqft,
            home.beds,
            home.baths,
            home.price_per_sqft
        );
    }

    println!(
        "\nPricing: {} (average ${}/sqft)",
        insights.pricing.classification.label(),
        insights.pricing.average_price_per_sqft
    );
}

pub(crate) fn write_homes_csv<W: io::Write>(
    writer: W,
    homes: &[ComparableHome],
) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HOMES_CSV_HEADER)?;
    for home in homes {
        writer.serialize(home)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homes_csv_has_header_and_one_row_per_home() {
        let homes = vec![ComparableHome {
            address: "1 Maple Ave, Renton, WA, 98059".to_string(),
            price: 500_000,
            living_area_sqft: 2_000,
            beds: 3,
            baths: 2,
            price_per_sqft: 250,
        }];

        let mut buffer = Vec::new();
        write_homes_csv(&mut buffer, &homes).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "address,price,living_area_sqft,beds,baths,price_per_sqft"
        );
        assert_eq!(lines[1], "\"1 Maple Ave, Renton, WA, 98059\",500000,2000,3,2,250");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_homes_still_write_a_header() {
        let mut buffer = Vec::new();
        write_homes_csv(&mut buffer, &[]).expect("csv written");
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "address,price,living_area_sqft,beds,baths,price_per_sqft\n"
        );
    }
}
