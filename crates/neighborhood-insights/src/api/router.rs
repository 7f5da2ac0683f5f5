use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::insights::{transform, NeighborhoodInsights, RawPropertyPayload};
use crate::providers::{AddressSuggestion, PropertyDataProvider, SuggestionProvider};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
pub const INPUT_REQUIRED: &str = "Input parameter is required";
const ADDRESS_REQUIRED: &str = "Address parameter is required";

/// The two providers the HTTP handlers delegate to.
pub struct InsightsServices<S, P> {
    pub suggestions: S,
    pub property: P,
}

impl<S, P> InsightsServices<S, P> {
    pub fn new(suggestions: S, property: P) -> Self {
        Self {
            suggestions,
            property,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub predictions: Vec<AddressSuggestion>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsQuery {
    #[serde(default)]
    input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressQuery {
    #[serde(default)]
    address: Option<String>,
}

/// Router builder exposing the suggestion and property lookup endpoints.
pub fn insights_router<S, P>(services: Arc<InsightsServices<S, P>>) -> Router
where
    S: SuggestionProvider + 'static,
    P: PropertyDataProvider + 'static,
{
    Router::new()
        .route("/suggestions", get(suggestions_handler::<S, P>))
        .route("/property-insights", get(property_insights_handler::<S, P>))
        .route(
            "/neighborhood-insights",
            get(neighborhood_insights_handler::<S, P>),
        )
        .with_state(services)
}

pub(crate) async fn suggestions_handler<S, P>(
    State(services): State<Arc<InsightsServices<S, P>>>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<SuggestionsResponse>, AppError>
where
    S: SuggestionProvider + 'static,
    P: PropertyDataProvider + 'static,
{
    let input = required(query.input, INPUT_REQUIRED)?;
    let predictions = services
        .suggestions
        .fetch_suggestions(&input)
        .await
        .map_err(|err| {
            warn!(error = %err, "suggestion lookup failed");
            AppError::Provider(err)
        })?;

    let status = if predictions.is_empty() {
        STATUS_ZERO_RESULTS
    } else {
        STATUS_OK
    };
    Ok(Json(SuggestionsResponse {
        predictions,
        status: status.to_string(),
    }))
}

pub(crate) async fn property_insights_handler<S, P>(
    State(services): State<Arc<InsightsServices<S, P>>>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<RawPropertyPayload>, AppError>
where
    S: SuggestionProvider + 'static,
    P: PropertyDataProvider + 'static,
{
    let address = required(query.address, ADDRESS_REQUIRED)?;
    let payload = lookup(&services.property, &address).await?;
    Ok(Json(payload))
}

pub(crate) async fn neighborhood_insights_handler<S, P>(
    State(services): State<Arc<InsightsServices<S, P>>>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<NeighborhoodInsights>, AppError>
where
    S: SuggestionProvider + 'static,
    P: PropertyDataProvider + 'static,
{
    let address = required(query.address, ADDRESS_REQUIRED)?;
    let payload = lookup(&services.property, &address).await?;
    Ok(Json(transform(&payload, &address)))
}

async fn lookup<P>(provider: &P, address: &str) -> Result<RawPropertyPayload, AppError>
where
    P: PropertyDataProvider,
{
    provider
        .fetch_property_insights(address)
        .await
        .map_err(|err| {
            warn!(error = %err, "property lookup failed");
            AppError::Provider(err)
        })
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Validation(message.to_string())),
    }
}
