use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AddressSuggestion, ProviderError, ProviderKind, SuggestionProvider};
use crate::config::ProviderConfig;

const PLACE_TYPES: &str = "address";

/// Places autocomplete over HTTP. A missing key is reported per call, not at
/// construction.
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GooglePlacesClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ProviderError::transport(ProviderKind::Places, err))?;
        Ok(Self::new(
            http,
            config.places_endpoint.clone(),
            config.places_api_key.clone(),
        ))
    }
}

#[async_trait]
impl SuggestionProvider for GooglePlacesClient {
    async fn fetch_suggestions(
        &self,
        partial_input: &str,
    ) -> Result<Vec<AddressSuggestion>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::ConfigMissing {
                provider: ProviderKind::Places,
            })?;

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("input", partial_input),
                ("types", PLACE_TYPES),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Places, err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "places autocomplete request failed");
            return Err(ProviderError::RemoteFailure {
                provider: ProviderKind::Places,
                status_code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Places, err))?;

        Ok(parse_predictions(&body))
    }
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    predictions: Vec<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacesPrediction {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    place_id: Option<String>,
}

/// Maps an autocomplete body to suggestions. Anything other than a parseable
/// body with status `OK` is an empty result.
pub(crate) fn parse_predictions(body: &[u8]) -> Vec<AddressSuggestion> {
    let response: PlacesResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "places autocomplete body was not valid JSON");
            return Vec::new();
        }
    };

    match response.status.as_deref() {
        Some("OK") => {}
        other => {
            debug!(status = ?other, "places autocomplete returned no predictions");
            return Vec::new();
        }
    }

    let mut seen = HashSet::new();
    response
        .predictions
        .into_iter()
        .filter_map(|value| serde_json::from_value::<PlacesPrediction>(value).ok())
        .filter_map(|prediction| {
            let description = prediction
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())?;
            let id = prediction
                .place_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| description.clone());
            Some(AddressSuggestion { description, id })
        })
        .filter(|suggestion| seen.insert(suggestion.id.clone()))
        .collect()
}
