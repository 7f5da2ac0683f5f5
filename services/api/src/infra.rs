use metrics_exporter_prometheus::PrometheusHandle;
use neighborhood_insights::api::InsightsServices;
use neighborhood_insights::config::AppConfig;
use neighborhood_insights::error::AppError;
use neighborhood_insights::providers::{
    CachedPropertyProvider, CachedSuggestionProvider, GooglePlacesClient, RapidApiPropertyClient,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveSuggestions = CachedSuggestionProvider<GooglePlacesClient>;
pub(crate) type LiveProperty = CachedPropertyProvider<RapidApiPropertyClient>;
pub(crate) type LiveServices = InsightsServices<LiveSuggestions, LiveProperty>;

/// HTTP-backed providers behind the request cache. Missing credentials do not
/// fail here; each request reports them.
pub(crate) fn live_services(config: &AppConfig) -> Result<LiveServices, AppError> {
    let places = GooglePlacesClient::from_config(&config.providers)?;
    let property = RapidApiPropertyClient::from_config(&config.providers)?;

    Ok(InsightsServices::new(
        CachedSuggestionProvider::from_config(places, &config.query),
        CachedPropertyProvider::from_config(property, &config.query),
    ))
}
