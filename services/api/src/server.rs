use crate::cli::ServeArgs;
use crate::infra::{live_services, AppState};
use crate::routes::with_insights_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use neighborhood_insights::config::AppConfig;
use neighborhood_insights::error::AppError;
use neighborhood_insights::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if config.providers.places_api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; /suggestions will answer 500");
    }
    if config.providers.property_base_url.is_none() || config.providers.property_api_key.is_none()
    {
        warn!("RAPID_API_URL or RAPID_API_KEY is not set; property lookups will answer 500");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = Arc::new(live_services(&config)?);

    let app = with_insights_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "neighborhood insights service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
